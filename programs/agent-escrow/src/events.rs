//! Events emitted by the Agent Escrow program
//!
//! These events can be monitored via WebSocket subscriptions
//! by audit and indexing consumers.

use anchor_lang::prelude::*;

/// Emitted when the protocol is initialized
#[event]
pub struct ProtocolInitialized {
    pub authority: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the pause switch flips
#[event]
pub struct ProtocolPauseUpdated {
    pub authority: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}

/// Emitted when a worker registers
#[event]
pub struct AgentRegistered {
    pub worker: Pubkey,
    pub owner: Pubkey,
    pub metadata_uri: String,
    pub timestamp: i64,
}

/// Emitted when a job index is opened outside registration
#[event]
pub struct JobIndexOpened {
    pub identity: Pubkey,
    pub payer: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a job is created and its escrow locked
#[event]
pub struct JobCreated {
    pub job_id: u64,
    pub client: Pubkey,
    pub escrowed_amount: u64,
    pub allocated_amount: u64,
    /// Escrow beyond the summed shares, left in the job account
    pub unallocated_amount: u64,
    pub worker_count: u8,
    pub timestamp: i64,
}

/// Emitted when a job moves to ongoing
#[event]
pub struct JobStarted {
    pub job_id: u64,
    pub started_by: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a worker's proof is accepted
#[event]
pub struct ProofVerified {
    pub job_id: u64,
    pub worker_index: u8,
    pub worker: Pubkey,
    pub proof_hash: [u8; 32],
    pub timestamp: i64,
}

/// Emitted once per job, when settlement completes it
#[event]
pub struct JobCompleted {
    pub job_id: u64,
    pub total_paid: u64,
    pub timestamp: i64,
}

/// Reserved for a cancellation flow. Nothing emits it: no instruction moves
/// a job to `Cancelled`.
#[event]
pub struct JobCancelled {
    pub job_id: u64,
    pub client: Pubkey,
    pub timestamp: i64,
}

/// Emitted for each worker credited by settlement
#[event]
pub struct PaymentDistributed {
    pub job_id: u64,
    pub worker: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when an owner pulls a worker's balance
#[event]
pub struct FundsWithdrawn {
    pub worker: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Emitted when a client rates a completed job
#[event]
pub struct JobRated {
    pub job_id: u64,
    pub client: Pubkey,
    pub rating: u8,
    pub timestamp: i64,
}
