//! Property-based fuzz testing library for the Agent Escrow program
//!
//! `SimulatedLedger` models the on-chain instructions in memory so that
//! escrow, settlement, withdrawal and rating invariants can be checked
//! across random inputs and random operation sequences.
//!
//! # Usage
//!
//! ```bash
//! # Run all property-based tests
//! cargo test --release
//!
//! # Run the fuzz test runner
//! cargo run --release
//!
//! # Run with more iterations
//! PROPTEST_CASES=10000 cargo test --release
//! ```

pub mod arbitrary;
pub mod invariants;
pub mod scenarios;

pub use arbitrary::*;
pub use invariants::*;
pub use scenarios::*;

// Include fuzz targets as test modules
#[cfg(test)]
#[path = "../fuzz_targets/create_job.rs"]
mod create_job_tests;

#[cfg(test)]
#[path = "../fuzz_targets/submit_proof.rs"]
mod submit_proof_tests;

#[cfg(test)]
#[path = "../fuzz_targets/withdraw.rs"]
mod withdraw_tests;

#[cfg(test)]
#[path = "../fuzz_targets/rate_job.rs"]
mod rate_job_tests;

#[cfg(test)]
#[path = "../fuzz_targets/job_lifecycle.rs"]
mod job_lifecycle_tests;
