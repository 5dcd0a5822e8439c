//! Shared test fixtures

/// Fixtures for harness configuration
pub mod harness_fixtures {
    use crate::config::{CommandSpec, PhaseCommands, RunConfig, DEFAULT_NODE_PATTERN};
    use std::path::Path;
    use std::time::Duration;

    /// Commands that succeed immediately without side effects
    pub fn noop_commands() -> PhaseCommands {
        PhaseCommands {
            build: CommandSpec::new("true", Vec::<String>::new()),
            deploy: CommandSpec::new("true", Vec::<String>::new()),
            unit_tests: CommandSpec::new("true", Vec::<String>::new()),
            functional_tests: CommandSpec::new("true", Vec::<String>::new()),
        }
    }

    /// A RunConfig rooted in a temp directory, with fast polling and no-op
    /// commands. Callers override the pieces under test.
    pub fn test_config(root: &Path) -> RunConfig {
        let network_dir = root.join("localnet");
        std::fs::create_dir_all(&network_dir).unwrap();
        let workflow_fixture = root.join("workflows.json");
        std::fs::write(&workflow_fixture, r#"{"workflows": []}"#).unwrap();
        let log_dir = root.join("logs");
        std::fs::create_dir_all(&log_dir).unwrap();

        RunConfig {
            build: false,
            keep_alive: false,
            run_unit_tests: true,
            run_functional_tests: true,
            state_dir: network_dir.join("data"),
            network_dir,
            log_dir,
            workflow_fixture,
            endpoints: Vec::new(),
            node_pattern: DEFAULT_NODE_PATTERN.to_string(),
            poll_interval: Duration::from_millis(10),
            ready_timeout: Duration::from_millis(100),
            rpc_request_timeout: Duration::from_millis(500),
            commands: noop_commands(),
        }
    }
}
