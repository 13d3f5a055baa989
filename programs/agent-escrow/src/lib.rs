#![allow(unexpected_cfgs)]
//! Agent Escrow
//!
//! Escrow-backed settlement for jobs split across several workers. A client
//! locks lamports against a job, every assigned worker submits a proof of
//! completion, and the proof that completes the set credits each worker's
//! withdrawable balance in the same instruction. Workers' owners pull their
//! balances out; clients rate completed jobs once.

use anchor_lang::prelude::*;

declare_id!("DVMScGqPFqiBRJmoiHkihdxBw4LZ2yJ8H7nAxoA59uGm");

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;
use state::{Agent, Job, HASH_SIZE};

#[program]
pub mod agent_escrow {
    use super::*;

    /// Create the protocol configuration. The signer becomes the owner
    /// allowed to pause and unpause.
    pub fn initialize_protocol(ctx: Context<InitializeProtocol>) -> Result<()> {
        instructions::initialize_protocol::handler(ctx)
    }

    /// Block every mutating instruction except `unpause_protocol`.
    pub fn pause_protocol(ctx: Context<UpdatePause>) -> Result<()> {
        instructions::update_pause::handler(ctx, true)
    }

    pub fn unpause_protocol(ctx: Context<UpdatePause>) -> Result<()> {
        instructions::update_pause::handler(ctx, false)
    }

    /// Register `worker` in the directory with the signer as its owner.
    /// Also opens the worker's job index if it does not exist yet.
    ///
    /// # Arguments
    /// * `worker` - Payout identity the record is keyed by
    /// * `metadata_uri` - Printable ASCII, at most 128 characters
    pub fn register_agent(
        ctx: Context<RegisterAgent>,
        worker: Pubkey,
        metadata_uri: String,
    ) -> Result<()> {
        instructions::register_agent::handler(ctx, worker, metadata_uri)
    }

    /// Open the job index of an identity that is not a registered agent.
    pub fn open_job_index(ctx: Context<OpenJobIndex>, identity: Pubkey) -> Result<()> {
        instructions::open_job_index::handler(ctx, identity)
    }

    /// Create a job and lock `escrow_amount` lamports in it.
    ///
    /// # Arguments
    /// * `assigned_workers` - Worker identities, 1 to 10 entries
    /// * `per_worker_payment` - Share of each worker, same length
    /// * `escrow_amount` - Deposit, at least the sum of the shares
    ///
    /// Remaining accounts: each worker's job index, in assignment order.
    pub fn create_job<'info>(
        ctx: Context<'_, '_, '_, 'info, CreateJob<'info>>,
        assigned_workers: Vec<Pubkey>,
        per_worker_payment: Vec<u64>,
        escrow_amount: u64,
    ) -> Result<()> {
        instructions::create_job::handler(ctx, assigned_workers, per_worker_payment, escrow_amount)
    }

    /// Move a pending job to ongoing so proofs can be submitted.
    pub fn start_job(ctx: Context<StartJob>, job_id: u64) -> Result<()> {
        instructions::start_job::handler(ctx, job_id)
    }

    /// Submit the proof of the worker at `worker_index`. The proof that
    /// completes the set settles the job; that call must pass every
    /// worker's agent account as remaining accounts.
    pub fn submit_proof<'info>(
        ctx: Context<'_, '_, '_, 'info, SubmitProof<'info>>,
        job_id: u64,
        worker_index: u8,
        proof_hash: [u8; HASH_SIZE],
    ) -> Result<()> {
        instructions::submit_proof::handler(ctx, job_id, worker_index, proof_hash)
    }

    /// Pay the worker's whole available balance to the agent owner.
    pub fn withdraw(ctx: Context<Withdraw>, worker: Pubkey) -> Result<()> {
        instructions::withdraw::handler(ctx, worker)
    }

    /// Rate a completed job, 1 to 5. Client only, once.
    pub fn rate_job(ctx: Context<RateJob>, job_id: u64, rating: u8) -> Result<()> {
        instructions::rate_job::handler(ctx, job_id, rating)
    }

    pub fn get_job(ctx: Context<GetJob>, _job_id: u64) -> Result<Job> {
        instructions::views::get_job_handler(ctx)
    }

    pub fn get_agent(ctx: Context<GetAgent>, _worker: Pubkey) -> Result<Agent> {
        instructions::views::get_agent_handler(ctx)
    }

    /// Job ids created by `client`, `JOBS_PER_PAGE` at a time.
    pub fn list_client_jobs(ctx: Context<ListJobs>, _client: Pubkey, page: u32) -> Result<Vec<u64>> {
        instructions::views::list_jobs_handler(ctx, page)
    }

    /// Job ids `worker` is assigned to, `JOBS_PER_PAGE` at a time.
    pub fn list_agent_jobs(ctx: Context<ListJobs>, _worker: Pubkey, page: u32) -> Result<Vec<u64>> {
        instructions::views::list_jobs_handler(ctx, page)
    }
}
