//! localnet-harness - lifecycle orchestration for a multi-shard blockchain localnet
//!
//! This crate builds a node binary, deploys a local multi-shard network, waits
//! for it to accept RPC traffic and progress past genesis, runs the selected
//! test suites against it, and tears the network down on every exit path.
//!
//! ## Modules
//!
//! - [`orchestrator`]: sequences the lifecycle phases and owns the aggregate
//!   run status and the teardown guarantee
//! - [`readiness`]: the two-phase polling state machine that decides when the
//!   network is safe to test against
//! - [`phase`]: subprocess execution with per-phase log artifacts
//! - [`suites`]: the unit/conformance and functional test-suite adapters

pub mod config;
pub mod error;
pub mod fixture;
pub mod orchestrator;
pub mod phase;
pub mod readiness;
pub mod rpc;
pub mod status;
pub mod suites;
pub mod teardown;

#[cfg(test)]
pub mod testing;
