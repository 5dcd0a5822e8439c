//! Typed errors for the harness lifecycle
//!
//! Setup precondition failures are the only errors allowed to escape before
//! teardown is armed; everything later is folded into recorded phase outcomes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Required external directory or file absent at setup
    #[error("missing prerequisite {what}: {path}")]
    MissingPrerequisite { what: &'static str, path: PathBuf },

    /// Could not clear stale artifacts from a previous run
    #[error("failed to reset run artifacts at {path}")]
    ArtifactReset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workflow fixture unreadable
    #[error("failed to read workflow fixture {path}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workflow fixture is not a JSON document
    #[error("workflow fixture {path} is not valid JSON")]
    InvalidFixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Readiness poller exhausted its attempt budget
    #[error("network not ready after {attempts} attempts")]
    TimedOut { attempts: u32 },

    /// External abort signal observed
    #[error("run interrupted")]
    Interrupted,
}

impl HarnessError {
    /// Setup precondition failures abort the run before any process starts.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingPrerequisite { .. }
                | Self::ArtifactReset { .. }
                | Self::FixtureIo { .. }
                | Self::InvalidFixture { .. }
        )
    }
}
