//! Transaction-workflow fixture preflight
//!
//! The fixture is a declarative document of workflows, scenarios, and actions
//! with `{{path.to.value}}` interpolation, consumed by an external
//! conformance tool. The harness only verifies it exists and is JSON before
//! forwarding the path; action semantics are never interpreted here.

use crate::error::HarnessError;
use std::path::Path;
use tracing::debug;

/// Setup preflight: the fixture file exists and parses as JSON.
pub fn verify_fixture(path: &Path) -> Result<(), HarnessError> {
    if !path.is_file() {
        return Err(HarnessError::MissingPrerequisite {
            what: "workflow fixture",
            path: path.to_path_buf(),
        });
    }
    let raw = std::fs::read_to_string(path).map_err(|source| HarnessError::FixtureIo {
        path: path.to_path_buf(),
        source,
    })?;
    let _: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| HarnessError::InvalidFixture {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = ?path, "Workflow fixture verified");
    Ok(())
}
