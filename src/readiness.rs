//! Two-phase readiness polling against a shard RPC endpoint
//!
//! A just-deployed network goes through two observable stages: first it
//! starts answering RPC at all (liveness), then it produces state past the
//! genesis block (progress). The poller walks those stages in strict order
//! with a constant retry interval and a shared attempt budget; the expected
//! wait is short and bounded, so there is no backoff.

use crate::error::HarnessError;
use crate::rpc::{RpcClient, RpcError};
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Height reported by a chain that has accepted connections but not yet
/// produced its genesis-successor state
pub const GENESIS_HEIGHT: u64 = 0;

/// Lightweight no-parameter probe; any answered call counts as liveness
const LIVENESS_METHOD: &str = "net_version";

/// Current chain height as a hex-encoded string
const HEIGHT_METHOD: &str = "eth_blockNumber";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessPhase {
    /// No RPC response observed yet
    Unreachable,
    /// Liveness succeeded, progress not yet checked
    Reachable,
    /// Endpoint answers but the chain is still at genesis
    Syncing,
    Ready,
}

/// Transient poller state, dropped when [`await_ready`] returns
#[derive(Debug)]
struct ReadinessState {
    elapsed_attempts: u32,
    deadline_attempts: u32,
    phase: ReadinessPhase,
}

/// Number of attempts a `timeout` buys at a constant `interval`.
///
/// A timeout shorter than one interval still buys a single attempt.
pub fn attempt_budget(interval: Duration, timeout: Duration) -> u32 {
    let interval_ms = interval.as_millis().max(1);
    ((timeout.as_millis() / interval_ms) as u32).max(1)
}

/// Extract a block height from an RPC `result` value.
///
/// Returns `None` for anything that is not a `0x`-prefixed hex string; the
/// caller retries rather than failing on a malformed response.
pub fn parse_height(result: &Value) -> Option<u64> {
    let digits = result.as_str()?.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}

/// Block until `endpoint` is live and its chain has progressed past genesis.
///
/// Every failed attempt, in either probe phase, consumes one unit of the
/// shared budget; exhausting it fails with [`HarnessError::TimedOut`]
/// carrying the number of attempts made. Unreachable and merely slow
/// endpoints are retried identically; failed probes are never classified
/// into different retry strategies.
pub async fn await_ready(
    client: &RpcClient,
    endpoint: &str,
    interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), HarnessError> {
    let mut state = ReadinessState {
        elapsed_attempts: 0,
        deadline_attempts: attempt_budget(interval, timeout),
        phase: ReadinessPhase::Unreachable,
    };
    debug!(
        endpoint,
        deadline_attempts = state.deadline_attempts,
        interval_secs = interval.as_secs_f64(),
        "Waiting for shard readiness"
    );

    loop {
        if cancel.is_cancelled() {
            return Err(HarnessError::Interrupted);
        }

        match state.phase {
            ReadinessPhase::Unreachable => {
                match client.call(endpoint, LIVENESS_METHOD, json!([])).await {
                    // Any 2xx body, envelope or not, means the endpoint
                    // answered; only transport failures count against the
                    // budget.
                    Ok(_)
                    | Err(RpcError::ErrorResponse { .. })
                    | Err(RpcError::InvalidEnvelope(_)) => {
                        debug!(endpoint, "Endpoint is live");
                        state.phase = ReadinessPhase::Reachable;
                        continue;
                    }
                    Err(e) => {
                        debug!(endpoint, error = %e, "Liveness probe failed");
                    }
                }
            }
            ReadinessPhase::Reachable | ReadinessPhase::Syncing => {
                match client.call(endpoint, HEIGHT_METHOD, json!([])).await {
                    Ok(result) => match parse_height(&result) {
                        Some(GENESIS_HEIGHT) => {
                            debug!(endpoint, "Chain still at genesis");
                            state.phase = ReadinessPhase::Syncing;
                        }
                        Some(height) => {
                            info!(
                                endpoint,
                                height,
                                attempts = state.elapsed_attempts,
                                "Shard is ready"
                            );
                            state.phase = ReadinessPhase::Ready;
                            continue;
                        }
                        None => {
                            warn!(endpoint, ?result, "Malformed block height, retrying");
                        }
                    },
                    Err(e) => {
                        debug!(endpoint, error = %e, "Progress probe failed");
                    }
                }
            }
            ReadinessPhase::Ready => return Ok(()),
        }

        state.elapsed_attempts += 1;
        if state.elapsed_attempts >= state.deadline_attempts {
            return Err(HarnessError::TimedOut {
                attempts: state.elapsed_attempts,
            });
        }

        println!("waiting for network at {endpoint}...");
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => return Err(HarnessError::Interrupted),
        }
    }
}
