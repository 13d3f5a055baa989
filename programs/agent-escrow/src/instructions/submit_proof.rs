//! Submit a worker's completion proof; the last missing proof settles the job

use crate::errors::EscrowError;
use crate::events::{JobCompleted, ProofVerified};
use crate::instructions::lamport_transfer::rent_floor;
use crate::instructions::proof_helpers::record_proof;
use crate::instructions::settlement_helpers::{record_settlement, settle_job};
use crate::state::{Job, ProtocolConfig, HASH_SIZE};
use crate::utils::access::require_not_paused;
use crate::utils::guard;
use crate::utils::verifier::PlaceholderVerifier;
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(job_id: u64)]
pub struct SubmitProof<'info> {
    #[account(
        mut,
        seeds = [b"job", job_id.to_le_bytes().as_ref()],
        bump = job.bump
    )]
    pub job: Account<'info, Job>,

    #[account(
        mut,
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    pub submitter: Signer<'info>,
}

/// Records the proof for `assigned_workers[worker_index]`.
///
/// Remaining accounts: only read when this proof completes the set. Then
/// they must be the agent account of every assigned worker, in assignment
/// order, and the job settles in this instruction.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, SubmitProof<'info>>,
    job_id: u64,
    worker_index: u8,
    proof_hash: [u8; HASH_SIZE],
) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;

    let clock = Clock::get()?;
    let job = &mut ctx.accounts.job;
    let ready = record_proof(job, worker_index, proof_hash, &PlaceholderVerifier)?;
    let worker = job.assigned_workers[worker_index as usize];

    emit!(ProofVerified {
        job_id,
        worker_index,
        worker,
        proof_hash,
        timestamp: clock.unix_timestamp,
    });

    if !ready {
        return Ok(());
    }

    require!(
        ctx.remaining_accounts.len() >= ctx.accounts.job.worker_count(),
        EscrowError::WorkerAccountsRequired
    );

    let job_rent_floor = rent_floor(ctx.accounts.job.to_account_info().data_len())?;

    let config = &mut ctx.accounts.protocol_config;
    guard::acquire(&mut config.reentrancy_locked)?;
    let total_paid = settle_job(
        &mut ctx.accounts.job,
        ctx.remaining_accounts,
        clock.unix_timestamp,
        job_rent_floor,
    )?;
    let config = &mut ctx.accounts.protocol_config;
    record_settlement(config, total_paid)?;
    guard::release(&mut config.reentrancy_locked);

    msg!("Job {} settled, {} lamports credited", job_id, total_paid);

    emit!(JobCompleted {
        job_id,
        total_paid,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
