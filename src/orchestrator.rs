//! Lifecycle orchestration
//!
//! Sequences setup, build+deploy, readiness wait, and the test suites, folds
//! every phase outcome into the aggregate status, and guarantees teardown on
//! every exit path. Interruption is modelled as a single cancellation token:
//! the signal listener cancels it, in-flight work observes it at the next
//! phase boundary, and no new phase starts afterward.

use crate::config::RunConfig;
use crate::error::HarnessError;
use crate::fixture;
use crate::phase::{self, PhaseOutcome};
use crate::readiness;
use crate::rpc::RpcClient;
use crate::status::{AggregateStatus, EXIT_FAILURE};
use crate::suites;
use crate::teardown::{TeardownAction, TeardownPlan};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Execute one full harness run and return the process exit code.
///
/// Teardown is armed before any other side effect and fires exactly once,
/// whether the run completes, fails a phase, aborts on a missing
/// prerequisite, or is interrupted.
pub async fn run(config: RunConfig) -> i32 {
    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());
    run_with_cancel(config, cancel).await
}

/// [`run`] with the interrupt signal injected by the caller; cancelling the
/// token stops the run at the next phase boundary.
pub async fn run_with_cancel(config: RunConfig, cancel: CancellationToken) -> i32 {
    let teardown = TeardownAction::from_plan(TeardownPlan {
        kill_pattern: config.node_pattern.clone(),
        state_dir: config.state_dir.clone(),
    });
    let status = AggregateStatus::new();
    let mut outcomes = Vec::new();

    match run_phases(&config, &status, &cancel, &mut outcomes).await {
        Ok(()) => {}
        Err(e) if e.is_precondition() => {
            error!(error = %e, "Setup precondition failed, aborting run");
            teardown.fire().await;
            return EXIT_FAILURE;
        }
        Err(HarnessError::Interrupted) => {
            info!("Run interrupted, skipping remaining phases");
        }
        Err(e) => {
            // Readiness never confirmed: the deployed network is unusable,
            // so the test phases were skipped and the run has failed.
            error!(error = %e, "Run aborted before test suites");
            let outcome = PhaseOutcome::failed("deploy", EXIT_FAILURE);
            status.record(&outcome);
            outcomes.push(outcome);
        }
    }

    write_summary(&config, &status, &outcomes);

    if config.keep_alive && !cancel.is_cancelled() {
        println!("keep-alive: network left running for inspection, press Ctrl-C to tear down");
        cancel.cancelled().await;
    }

    teardown.fire().await;
    info!(exit_code = status.exit_code(), "Run complete");
    status.exit_code()
}

fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down after the current step");
            cancel.cancel();
        }
    });
}

/// Setup: idempotent teardown-then-verify of prerequisites. Runs before any
/// process is started.
fn setup(config: &RunConfig) -> Result<(), HarnessError> {
    phase::reset_artifacts(&config.state_dir, &config.log_dir).map_err(|source| {
        HarnessError::ArtifactReset {
            path: config.state_dir.clone(),
            source,
        }
    })?;
    if !config.network_dir.is_dir() {
        return Err(HarnessError::MissingPrerequisite {
            what: "network configuration directory",
            path: config.network_dir.clone(),
        });
    }
    fixture::verify_fixture(&config.workflow_fixture)?;
    info!(network_dir = ?config.network_dir, "Setup complete");
    Ok(())
}

async fn run_phases(
    config: &RunConfig,
    status: &AggregateStatus,
    cancel: &CancellationToken,
    outcomes: &mut Vec<PhaseOutcome>,
) -> Result<(), HarnessError> {
    setup(config)?;

    if !config.run_unit_tests && !config.run_functional_tests {
        warn!("No test suites selected; this run is a no-op");
    }

    if config.build {
        if cancel.is_cancelled() {
            return Err(HarnessError::Interrupted);
        }
        let outcome = phase::run_phase("build", &config.commands.build, &config.log_dir).await;
        status.record(&outcome);
        outcomes.push(outcome);

        if cancel.is_cancelled() {
            return Err(HarnessError::Interrupted);
        }
        // Deploy runs detached: it keeps the network alive while the
        // orchestrator moves on to block on readiness instead.
        match phase::spawn_detached("deploy", &config.commands.deploy, &config.log_dir) {
            Ok(_child) => {}
            Err(e) => {
                error!(error = %e, "Failed to start deploy");
                let outcome = PhaseOutcome::failed("deploy", phase::EXIT_SPAWN_FAILED);
                status.record(&outcome);
                outcomes.push(outcome);
                return Ok(());
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(HarnessError::Interrupted);
    }

    let client = RpcClient::new(config.rpc_request_timeout);
    for endpoint in &config.endpoints {
        match readiness::await_ready(
            &client,
            endpoint,
            config.poll_interval,
            config.ready_timeout,
            cancel,
        )
        .await
        {
            Ok(()) => {}
            Err(HarnessError::Interrupted) => return Err(HarnessError::Interrupted),
            Err(e) => {
                error!(endpoint = %endpoint, error = %e, "Network never became ready");
                return Err(e);
            }
        }
    }

    if config.run_unit_tests {
        if cancel.is_cancelled() {
            return Err(HarnessError::Interrupted);
        }
        let outcome = suites::run_unit_suite(config).await;
        status.record(&outcome);
        outcomes.push(outcome);
    }

    if config.run_functional_tests {
        if cancel.is_cancelled() {
            return Err(HarnessError::Interrupted);
        }
        let outcome = suites::run_functional_suite(config).await;
        status.record(&outcome);
        outcomes.push(outcome);
    }

    Ok(())
}

/// Drop a machine-readable run summary next to the phase logs.
fn write_summary(config: &RunConfig, status: &AggregateStatus, outcomes: &[PhaseOutcome]) {
    let summary = serde_json::json!({
        "success": !status.is_failure(),
        "phases": outcomes,
    });
    let path = config.log_dir.join("summary.json");
    match serde_json::to_string_pretty(&summary) {
        Ok(rendered) => {
            if let Err(e) = std::fs::write(&path, rendered) {
                warn!(path = ?path, error = %e, "Failed to write run summary");
            }
        }
        Err(e) => warn!(error = %e, "Failed to render run summary"),
    }
}
