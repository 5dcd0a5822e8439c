//! Aggregate run status: a monotonic failure latch
//!
//! The only state mutated by more than one phase. Writes are monotonic
//! toward failure, so an atomic store is all the discipline required; no
//! phase reads it mid-run except the final exit step.

use crate::phase::PhaseOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Default)]
pub struct AggregateStatus {
    failed: AtomicBool,
}

impl AggregateStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a phase outcome into the run status. A failed outcome latches
    /// failure; success never unlatches it.
    pub fn record(&self, outcome: &PhaseOutcome) {
        if !outcome.succeeded {
            warn!(
                phase = %outcome.name,
                exit_code = outcome.exit_code,
                "Phase failed, run status latched to failure"
            );
            self.failed.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_failure() {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }
}
