//! localnet-harness: deploy a multi-shard localnet and test against it
//!
//! Sequences build, deploy, readiness wait, and the selected test suites,
//! then tears the network down. Consumed by CI and by developers iterating
//! locally; the final status is the process exit code.

use clap::Parser;
use localnet_harness::config::{self, PhaseCommands, RunConfig};
use localnet_harness::orchestrator;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "localnet-harness")]
#[command(about = "Build, deploy, and test a multi-shard blockchain localnet")]
#[command(version)]
struct Args {
    /// Do not rebuild and redeploy the node; test an already-running network
    #[arg(long)]
    skip_build: bool,

    /// Leave the network running after tests complete
    #[arg(long)]
    keep_alive: bool,

    /// Run only the unit/conformance suite
    #[arg(long, conflicts_with = "only_functional")]
    only_unit: bool,

    /// Run only the functional RPC test suite
    #[arg(long)]
    only_functional: bool,

    /// Directory holding the localnet configuration and deploy scripts
    #[arg(long, default_value = "localnet")]
    network_dir: PathBuf,

    /// Directory for per-phase log artifacts
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Transaction-workflow fixture forwarded to the conformance tool
    #[arg(long, default_value = "fixtures/workflows.json")]
    fixture: PathBuf,

    /// Shard RPC endpoint to await, ordered by shard (repeatable)
    #[arg(long = "endpoint")]
    endpoints: Vec<String>,

    /// Process pattern terminated by teardown
    #[arg(long, default_value = config::DEFAULT_NODE_PATTERN)]
    node_pattern: String,

    /// Seconds between readiness probes
    #[arg(long, default_value_t = config::DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Total seconds to wait for each shard to become ready
    #[arg(long, default_value_t = config::DEFAULT_READY_TIMEOUT_SECS)]
    ready_timeout: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let endpoints = if args.endpoints.is_empty() {
        config::DEFAULT_SHARD_ENDPOINTS
            .iter()
            .map(|e| e.to_string())
            .collect()
    } else {
        args.endpoints.clone()
    };
    let (run_unit_tests, run_functional_tests) =
        config::suite_selection(args.only_unit, args.only_functional);
    let commands = PhaseCommands::defaults(&args.network_dir, &args.fixture, &endpoints);

    let config = RunConfig {
        build: !args.skip_build,
        keep_alive: args.keep_alive,
        run_unit_tests,
        run_functional_tests,
        state_dir: args.network_dir.join("data"),
        network_dir: args.network_dir,
        log_dir: args.log_dir,
        workflow_fixture: args.fixture,
        endpoints,
        node_pattern: args.node_pattern,
        poll_interval: Duration::from_secs(args.poll_interval),
        ready_timeout: Duration::from_secs(args.ready_timeout),
        rpc_request_timeout: Duration::from_secs(config::DEFAULT_RPC_REQUEST_TIMEOUT_SECS),
        commands,
    };

    info!(
        build = config.build,
        keep_alive = config.keep_alive,
        unit = config.run_unit_tests,
        functional = config.run_functional_tests,
        shards = config.endpoints.len(),
        "Starting localnet harness run"
    );

    let code = orchestrator::run(config).await;
    std::process::exit(code);
}
