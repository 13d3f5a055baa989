//! Instruction handlers for the Agent Escrow program

pub mod constants;
pub mod job_helpers;
pub mod lamport_transfer;
pub mod proof_helpers;
pub mod settlement_helpers;
pub mod withdrawal_helpers;

#[cfg(test)]
pub(crate) mod test_accounts;

pub mod create_job;
pub mod initialize_protocol;
pub mod open_job_index;
pub mod rate_job;
pub mod register_agent;
pub mod start_job;
pub mod submit_proof;
pub mod update_pause;
pub mod views;
pub mod withdraw;

#[allow(ambiguous_glob_reexports)]
pub use create_job::*;
#[allow(ambiguous_glob_reexports)]
pub use initialize_protocol::*;
#[allow(ambiguous_glob_reexports)]
pub use open_job_index::*;
#[allow(ambiguous_glob_reexports)]
pub use rate_job::*;
#[allow(ambiguous_glob_reexports)]
pub use register_agent::*;
#[allow(ambiguous_glob_reexports)]
pub use start_job::*;
#[allow(ambiguous_glob_reexports)]
pub use submit_proof::*;
#[allow(ambiguous_glob_reexports)]
pub use update_pause::*;
pub use views::*;
#[allow(ambiguous_glob_reexports)]
pub use withdraw::*;
