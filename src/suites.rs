//! Test suite adapters
//!
//! Two independent adapters over external runners. Each reports its outcome
//! for the orchestrator to fold into the aggregate status; neither
//! short-circuits the other.

use crate::config::RunConfig;
use crate::phase::{self, PhaseOutcome};

pub const UNIT_SUITE: &str = "unit-tests";
pub const FUNCTIONAL_SUITE: &str = "functional-tests";

/// Run the unit/conformance suite against the freshly built binary.
///
/// The transaction-workflow fixture is forwarded to the external tool
/// unmodified; its pass/fail result is returned unchanged.
pub async fn run_unit_suite(config: &RunConfig) -> PhaseOutcome {
    phase::run_phase(UNIT_SUITE, &config.commands.unit_tests, &config.log_dir).await
}

/// Run the functional suite against the live network's RPC endpoints.
///
/// The external runner is invoked with a small fixed worker count and stops
/// issuing new cases on its first failure; that fail-fast is internal to this
/// suite and never skips the sibling adapter or teardown.
pub async fn run_functional_suite(config: &RunConfig) -> PhaseOutcome {
    phase::run_phase(
        FUNCTIONAL_SUITE,
        &config.commands.functional_tests,
        &config.log_dir,
    )
    .await
}
