//! Guaranteed network teardown
//!
//! One teardown action is registered at startup and fired from the single
//! exit path of the orchestrator, whatever got the run there: normal
//! completion, phase failure, precondition abort, or interruption. Firing is
//! idempotent at two levels: the action runs at most once, and the plan
//! itself tolerates nothing being deployed.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// What teardown actually does: terminate localnet node processes and drop
/// their transient state, releasing the shard ports.
#[derive(Debug, Clone)]
pub struct TeardownPlan {
    /// Pattern matched against node process command lines
    pub kill_pattern: String,
    /// Transient network identity/state files
    pub state_dir: PathBuf,
}

impl TeardownPlan {
    pub async fn execute(&self) {
        info!(pattern = %self.kill_pattern, "Tearing down localnet");

        match Command::new("pkill")
            .args(["-f", &self.kill_pattern])
            .status()
            .await
        {
            Ok(status) if status.success() => {
                info!(pattern = %self.kill_pattern, "Terminated localnet processes");
            }
            Ok(_) => {
                debug!(pattern = %self.kill_pattern, "No localnet processes to terminate");
            }
            Err(e) => {
                warn!(error = %e, "Failed to run pkill");
            }
        }

        match tokio::fs::remove_dir_all(&self.state_dir).await {
            Ok(()) => debug!(path = ?self.state_dir, "Removed network state"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?self.state_dir, error = %e, "Failed to remove network state"),
        }
    }
}

type BoxedAction = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// A no-argument side-effecting teardown procedure that runs at most once.
pub struct TeardownAction {
    fired: AtomicBool,
    action: BoxedAction,
}

impl TeardownAction {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            fired: AtomicBool::new(false),
            action: Box::new(move || Box::pin(action())),
        }
    }

    pub fn from_plan(plan: TeardownPlan) -> Self {
        let plan = Arc::new(plan);
        Self::new(move || {
            let plan = plan.clone();
            async move { plan.execute().await }
        })
    }

    /// Run the teardown action if it has not run yet. Returns whether this
    /// call performed the teardown.
    pub async fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("Teardown already executed, skipping");
            return false;
        }
        (self.action)().await;
        true
    }
}
