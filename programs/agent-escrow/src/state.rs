//! Account state structures for the Agent Escrow program

use anchor_lang::prelude::*;

use crate::instructions::constants::{FIRST_JOB_ID, JOBS_PER_PAGE, MAX_WORKERS};

// ============================================================================
// Size Constants
// ============================================================================

/// Size of proof hashes and identities (SHA256, Pubkey bytes)
pub const HASH_SIZE: usize = 32;

/// A proof hash that carries no evidence.
pub const EMPTY_PROOF_HASH: [u8; HASH_SIZE] = [0u8; HASH_SIZE];

/// Job lifecycle status
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default, InitSpace)]
#[repr(u8)]
pub enum JobStatus {
    /// Escrow locked, work not started
    #[default]
    Pending = 0,
    /// Workers are producing proofs
    Ongoing = 1,
    /// All proofs verified and every worker credited (terminal)
    Completed = 2,
    /// Terminal. No instruction produces this status.
    Cancelled = 3,
}

impl JobStatus {
    /// Validates whether a status transition is allowed.
    ///
    /// Valid transitions:
    /// - Pending → Ongoing (start_job)
    /// - Ongoing → Completed (settlement after the last verified proof)
    ///
    /// `Cancelled` has no inbound transition. Terminal states cannot move.
    pub fn can_transition_to(&self, new_status: JobStatus) -> bool {
        use JobStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!((self, new_status), (Pending, Ongoing) | (Ongoing, Completed))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }
}

/// Protocol configuration account. Carries the pause switch, the designated
/// owner and the job id sequence; every mutating instruction reads it.
/// PDA seeds: ["protocol"]
#[account]
#[derive(InitSpace)]
pub struct ProtocolConfig {
    /// Designated owner. Set once at initialization.
    pub authority: Pubkey,
    /// Blocks every mutating instruction except pause/unpause
    pub paused: bool,
    /// Held while a value-moving instruction is in flight
    pub reentrancy_locked: bool,
    /// Next job id to hand out. Only `create_job` advances it.
    pub next_job_id: u64,
    /// Total registered agents
    pub total_agents: u64,
    /// Total jobs created
    pub total_jobs: u64,
    /// Total jobs settled
    pub completed_jobs: u64,
    /// Total lamports credited to workers by settlement
    pub total_value_distributed: u64,
    /// Total lamports paid out by withdrawals
    pub total_withdrawn: u64,
    /// Bump seed for PDA
    pub bump: u8,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            authority: Pubkey::default(),
            paused: false,
            reentrancy_locked: false,
            next_job_id: FIRST_JOB_ID,
            total_agents: 0,
            total_jobs: 0,
            completed_jobs: 0,
            total_value_distributed: 0,
            total_withdrawn: 0,
            bump: 0,
        }
    }
}

impl ProtocolConfig {
    pub const SIZE: usize = 8 + // discriminator
        32 + // authority
        1 +  // paused
        1 +  // reentrancy_locked
        8 +  // next_job_id
        8 +  // total_agents
        8 +  // total_jobs
        8 +  // completed_jobs
        8 +  // total_value_distributed
        8 +  // total_withdrawn
        1; // bump

    /// Hands out the next job id and advances the sequence.
    pub fn allocate_job_id(&mut self) -> Result<u64> {
        let job_id = self.next_job_id;
        self.next_job_id = self
            .next_job_id
            .checked_add(1)
            .ok_or(crate::errors::EscrowError::ArithmeticOverflow)?;
        Ok(job_id)
    }
}

/// Worker directory record
/// PDA seeds: ["agent", worker]
#[account]
#[derive(Default, InitSpace)]
pub struct Agent {
    /// Worker identity (payout target) this record belongs to
    pub worker: Pubkey,
    /// Identity allowed to withdraw. Immutable after registration.
    pub owner: Pubkey,
    /// Extended metadata URI (max 128 chars)
    #[max_len(128)]
    pub metadata_uri: String,
    /// Lifetime credited lamports
    pub total_earned: u64,
    /// Credited lamports not yet withdrawn
    pub available_balance: u64,
    /// Settled jobs this worker was paid for
    pub jobs_completed: u64,
    pub active: bool,
    /// Registration timestamp
    pub registered_at: i64,
    /// Per-agent critical-section token, held across the withdrawal transfer
    pub transfer_locked: bool,
    /// Bump seed
    pub bump: u8,
}

impl Agent {
    pub const SIZE: usize = 8 + // discriminator
        32 + // worker
        32 + // owner
        4 + 128 + // metadata_uri (string)
        8 +  // total_earned
        8 +  // available_balance
        8 +  // jobs_completed
        1 +  // active
        8 +  // registered_at
        1 +  // transfer_locked
        1; // bump

    pub fn is_registered(&self) -> bool {
        self.owner != Pubkey::default()
    }
}

/// Escrowed job
/// PDA seeds: ["job", job_id (u64 little endian)]
///
/// The four per-worker vectors are index-aligned and share one length in
/// `1..=MAX_WORKERS`.
#[account]
#[derive(Default, InitSpace)]
pub struct Job {
    /// Sequence-allocated identifier
    pub job_id: u64,
    /// Funding party
    pub client: Pubkey,
    /// Lamports deposited at creation. Anything above the sum of payments
    /// stays in the job account.
    pub escrowed_amount: u64,
    /// Creation timestamp
    pub created_at: i64,
    /// Completion timestamp (0 until settled)
    pub completed_at: i64,
    #[max_len(10)]
    pub assigned_workers: Vec<Pubkey>,
    #[max_len(10)]
    pub per_worker_payment: Vec<u64>,
    pub status: JobStatus,
    /// Client rating (1-5), meaningful only when `is_rated`
    pub rating: u8,
    pub is_rated: bool,
    #[max_len(10)]
    pub proof_hashes: Vec<[u8; 32]>,
    #[max_len(10)]
    pub verified: Vec<bool>,
    /// Bump seed
    pub bump: u8,
}

impl Job {
    pub const SIZE: usize = 8 + // discriminator
        8 +  // job_id
        32 + // client
        8 +  // escrowed_amount
        8 +  // created_at
        8 +  // completed_at
        4 + (32 * MAX_WORKERS) + // assigned_workers
        4 + (8 * MAX_WORKERS) +  // per_worker_payment
        1 +  // status
        1 +  // rating
        1 +  // is_rated
        4 + (HASH_SIZE * MAX_WORKERS) + // proof_hashes
        4 + MAX_WORKERS + // verified
        1; // bump

    pub fn worker_count(&self) -> usize {
        self.assigned_workers.len()
    }

    pub fn all_verified(&self) -> bool {
        !self.verified.is_empty() && self.verified.iter().all(|v| *v)
    }

    /// Sum of the per-worker shares, `None` on overflow.
    pub fn allocated_amount(&self) -> Option<u64> {
        self.per_worker_payment
            .iter()
            .try_fold(0u64, |acc, share| acc.checked_add(*share))
    }

    /// Escrow left in the account after every share is paid.
    pub fn unallocated_amount(&self) -> Option<u64> {
        self.escrowed_amount.checked_sub(self.allocated_amount()?)
    }
}

/// Every job id recorded under one identity (client or worker)
/// PDA seeds: ["job_index", identity]
///
/// Created at `SIZE` bytes with no ids. The account is resized by 8 bytes
/// for each id recorded, so no id is ever dropped.
#[account]
#[derive(Default)]
pub struct JobIndex {
    /// Identity the jobs are indexed under
    pub identity: Pubkey,
    /// Job ids in creation order
    pub job_ids: Vec<u64>,
    /// Bump seed
    pub bump: u8,
}

impl JobIndex {
    pub const SIZE: usize = 8 + // discriminator
        32 + // identity
        4 +  // job_ids (empty)
        1; // bump

    /// Account size needed to hold `job_count` ids.
    pub fn space_for(job_count: usize) -> usize {
        Self::SIZE + 8 * job_count
    }

    /// Appends a job id. Recording the most recent id again is a no-op, so
    /// a worker named twice in one job is indexed once. Returns whether the
    /// id was appended.
    pub fn record(&mut self, job_id: u64) -> bool {
        if self.job_ids.last() == Some(&job_id) {
            return false;
        }
        self.job_ids.push(job_id);
        true
    }

    /// Ids on page `page` (`JOBS_PER_PAGE` per page, oldest first). Pages
    /// past the end are empty.
    pub fn page(&self, page: u32) -> Vec<u64> {
        let start = (page as usize).saturating_mul(JOBS_PER_PAGE);
        self.job_ids
            .iter()
            .skip(start)
            .take(JOBS_PER_PAGE)
            .copied()
            .collect()
    }
}
