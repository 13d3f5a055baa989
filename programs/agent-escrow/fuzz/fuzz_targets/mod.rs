//! Fuzz target modules
//!
//! Each module contains property-based tests for one instruction, plus a
//! random-sequence target over the whole ledger.
//! Run all tests with: cargo test --release -p agent-escrow-fuzz

pub mod create_job;
pub mod job_lifecycle;
pub mod rate_job;
pub mod submit_proof;
pub mod withdraw;
