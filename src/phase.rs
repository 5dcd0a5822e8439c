//! Phase execution: external commands with log-artifact capture
//!
//! A phase is one independently-failable lifecycle step. Its combined output
//! is streamed to a phase-scoped log file for post-mortem inspection, and a
//! nonzero exit becomes a recorded outcome rather than an error, so the
//! orchestrator keeps sequencing.

use crate::config::CommandSpec;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Exit code recorded when the phase command could not be spawned
pub const EXIT_SPAWN_FAILED: i32 = 127;

/// Exit code recorded when the command was terminated by a signal
pub const EXIT_KILLED: i32 = -1;

/// Time to let the output-streaming tasks flush after the command exits
const STREAM_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of one lifecycle phase, immutable once produced
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub name: String,
    pub succeeded: bool,
    pub exit_code: i32,
}

impl PhaseOutcome {
    pub fn failed(name: &str, exit_code: i32) -> Self {
        Self {
            name: name.to_string(),
            succeeded: false,
            exit_code,
        }
    }
}

/// Log artifact location for a named phase
pub fn phase_log_path(log_dir: &Path, name: &str) -> PathBuf {
    log_dir.join(format!("{name}.log"))
}

/// Run a phase command to completion, capturing combined stdout/stderr to
/// `<log_dir>/<name>.log`.
///
/// Never propagates command failure: nonzero exit, spawn failure, and
/// signal termination all map to `succeeded = false` in the outcome.
pub async fn run_phase(name: &str, spec: &CommandSpec, log_dir: &Path) -> PhaseOutcome {
    info!(
        phase = name,
        program = %spec.program,
        args = ?spec.args,
        "Running phase"
    );

    let log_path = phase_log_path(log_dir, name);
    let log_file = match tokio::fs::File::create(&log_path).await {
        Ok(f) => Arc::new(Mutex::new(f)),
        Err(e) => {
            warn!(phase = name, path = ?log_path, error = %e, "Failed to create phase log");
            return PhaseOutcome::failed(name, EXIT_SPAWN_FAILED);
        }
    };

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &spec.cwd {
        command.current_dir(cwd);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(phase = name, program = %spec.program, error = %e, "Failed to spawn phase command");
            return PhaseOutcome::failed(name, EXIT_SPAWN_FAILED);
        }
    };

    let stdout_task = child.stdout.take().map(|stdout| {
        let sink = log_file.clone();
        tokio::spawn(stream_lines(stdout, sink))
    });
    let stderr_task = child.stderr.take().map(|stderr| {
        let sink = log_file.clone();
        tokio::spawn(stream_lines(stderr, sink))
    });

    let status = match child.wait().await {
        Ok(status) => status,
        Err(e) => {
            warn!(phase = name, error = %e, "Failed waiting for phase command");
            return PhaseOutcome::failed(name, EXIT_KILLED);
        }
    };

    if let Some(task) = stdout_task {
        let _ = tokio::time::timeout(STREAM_FLUSH_TIMEOUT, task).await;
    }
    if let Some(task) = stderr_task {
        let _ = tokio::time::timeout(STREAM_FLUSH_TIMEOUT, task).await;
    }
    {
        let mut file = log_file.lock().await;
        let _ = file.flush().await;
    }

    let exit_code = status.code().unwrap_or(EXIT_KILLED);
    let outcome = PhaseOutcome {
        name: name.to_string(),
        succeeded: status.success(),
        exit_code,
    };
    info!(
        phase = name,
        succeeded = outcome.succeeded,
        exit_code,
        log = ?log_path,
        "Phase finished"
    );
    outcome
}

async fn stream_lines(
    reader: impl tokio::io::AsyncRead + Unpin,
    sink: Arc<Mutex<tokio::fs::File>>,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut file = sink.lock().await;
        let _ = file.write_all(line.as_bytes()).await;
        let _ = file.write_all(b"\n").await;
    }
}

/// Start a long-running phase command detached from the harness.
///
/// Output is redirected to the phase log; the child is left running when the
/// handle is dropped (the deployed network outlives the call).
pub fn spawn_detached(
    name: &str,
    spec: &CommandSpec,
    log_dir: &Path,
) -> std::io::Result<std::process::Child> {
    let log_path = phase_log_path(log_dir, name);
    let stdout_file = std::fs::File::create(&log_path)?;
    let stderr_file = stdout_file.try_clone()?;

    let mut command = std::process::Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file));
    if let Some(cwd) = &spec.cwd {
        command.current_dir(cwd);
    }
    let child = command.spawn()?;
    info!(phase = name, pid = child.id(), log = ?log_path, "Phase started in background");
    Ok(child)
}

/// Clear stale artifacts from a previous, possibly-crashed run: prior network
/// state files are removed and the log directory is recreated empty.
///
/// Idempotent; tolerates the artifacts not existing.
pub fn reset_artifacts(state_dir: &Path, log_dir: &Path) -> std::io::Result<()> {
    remove_dir_if_present(state_dir)?;
    remove_dir_if_present(log_dir)?;
    std::fs::create_dir_all(log_dir)?;
    Ok(())
}

fn remove_dir_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
