//! Run configuration, resolved once at startup

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shard RPC endpoints, ordered by shard id
pub const DEFAULT_SHARD_ENDPOINTS: [&str; 2] =
    ["http://127.0.0.1:9599", "http://127.0.0.1:9598"];

/// Seconds between readiness probes (constant, no backoff)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Total seconds to wait for each shard to become ready
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 120;

/// Per-request timeout for readiness probes
pub const DEFAULT_RPC_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Worker count for the functional RPC test runner.
///
/// Deliberately a small fixed number rather than the host's parallelism: the
/// freshly started network rejects bursts of concurrent calls, and a reliable
/// run beats a fast one.
pub const DEFAULT_FUNCTIONAL_WORKERS: u32 = 4;

/// Process pattern the teardown step terminates
pub const DEFAULT_NODE_PATTERN: &str = "localnet-node";

/// An external command as an explicit argument list.
///
/// Commands are never built by string interpolation; arguments are passed
/// through to the OS as-is.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// External commands for each lifecycle phase
#[derive(Debug, Clone)]
pub struct PhaseCommands {
    pub build: CommandSpec,
    pub deploy: CommandSpec,
    pub unit_tests: CommandSpec,
    pub functional_tests: CommandSpec,
}

impl PhaseCommands {
    /// Default commands for a checkout that keeps its localnet scripts in
    /// `network_dir`.
    pub fn defaults(
        network_dir: &Path,
        workflow_fixture: &Path,
        endpoints: &[String],
    ) -> Self {
        let primary_endpoint = endpoints
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_SHARD_ENDPOINTS[0].to_string());
        Self {
            build: CommandSpec::new("make", ["node"]).with_cwd(network_dir),
            deploy: CommandSpec::new("./deploy.sh", ["--shards", "2"])
                .with_cwd(network_dir),
            unit_tests: CommandSpec::new(
                "workflow-conformance",
                [
                    "run".to_string(),
                    "--fixture".to_string(),
                    workflow_fixture.display().to_string(),
                ],
            )
            .with_cwd(network_dir),
            functional_tests: CommandSpec::new(
                "pytest",
                [
                    "tests".to_string(),
                    "-x".to_string(),
                    "-n".to_string(),
                    DEFAULT_FUNCTIONAL_WORKERS.to_string(),
                    "--rpc-endpoint".to_string(),
                    primary_endpoint,
                ],
            )
            .with_cwd(network_dir),
        }
    }
}

/// Immutable configuration for one harness run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Rebuild and redeploy the node before testing
    pub build: bool,
    /// Leave the network running after tests instead of tearing down
    pub keep_alive: bool,
    pub run_unit_tests: bool,
    pub run_functional_tests: bool,
    /// Prerequisite directory holding localnet configuration and scripts
    pub network_dir: PathBuf,
    /// Transient network identity/state files, reset before each deploy
    pub state_dir: PathBuf,
    /// Per-phase log artifacts
    pub log_dir: PathBuf,
    /// Opaque transaction-workflow fixture forwarded to the conformance tool
    pub workflow_fixture: PathBuf,
    /// Shard RPC endpoints to await, ordered by shard
    pub endpoints: Vec<String>,
    /// Process pattern terminated by teardown
    pub node_pattern: String,
    pub poll_interval: Duration,
    pub ready_timeout: Duration,
    pub rpc_request_timeout: Duration,
    pub commands: PhaseCommands,
}

/// Map the `only-unit` / `only-functional` CLI flags to suite selection.
///
/// Returns `(run_unit_tests, run_functional_tests)`. With neither flag both
/// suites run; each flag disables its sibling.
pub fn suite_selection(only_unit: bool, only_functional: bool) -> (bool, bool) {
    (!only_functional, !only_unit)
}
