//! Create a job and lock its escrow

use crate::errors::EscrowError;
use crate::events::JobCreated;
use crate::instructions::job_helpers::{index_job, init_job_fields, validate_job_params};
use crate::state::{Job, JobIndex, ProtocolConfig};
use crate::utils::access::require_not_paused;
use crate::utils::guard;
use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_lang::AccountsExit;

#[derive(Accounts)]
pub struct CreateJob<'info> {
    #[account(
        mut,
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// Addressed by the id the sequence hands out next
    #[account(
        init,
        payer = client,
        space = Job::SIZE,
        seeds = [b"job", protocol_config.next_job_id.to_le_bytes().as_ref()],
        bump
    )]
    pub job: Account<'info, Job>,

    /// Grown by one id per job, so it is opened beforehand by
    /// `open_job_index` rather than here.
    #[account(
        mut,
        seeds = [b"job_index", client.key().as_ref()],
        bump = client_index.bump
    )]
    pub client_index: Account<'info, JobIndex>,

    #[account(mut)]
    pub client: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Creates a job paying `per_worker_payment[i]` to `assigned_workers[i]`
/// and moves `escrow_amount` lamports from the client into the job
/// account.
///
/// Remaining accounts: the job index of each assigned worker, in
/// assignment order.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, CreateJob<'info>>,
    assigned_workers: Vec<Pubkey>,
    per_worker_payment: Vec<u64>,
    escrow_amount: u64,
) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;
    let allocated = validate_job_params(&assigned_workers, &per_worker_payment, escrow_amount)?;

    let clock = Clock::get()?;
    let client = ctx.accounts.client.key();
    let worker_count = assigned_workers.len() as u8;

    let config = &mut ctx.accounts.protocol_config;
    guard::acquire(&mut config.reentrancy_locked)?;
    let job_id = config.allocate_job_id()?;
    config.total_jobs = config
        .total_jobs
        .checked_add(1)
        .ok_or(EscrowError::ArithmeticOverflow)?;

    init_job_fields(
        &mut ctx.accounts.job,
        job_id,
        client,
        escrow_amount,
        assigned_workers.clone(),
        per_worker_payment,
        clock.unix_timestamp,
        ctx.bumps.job,
    );

    let unallocated = ctx
        .accounts
        .job
        .unallocated_amount()
        .ok_or(EscrowError::ArithmeticOverflow)?;

    index_job(
        &mut ctx.accounts.client_index,
        &client,
        &assigned_workers,
        ctx.remaining_accounts,
        &ctx.accounts.client.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        job_id,
    )?;

    // Persist the held flag before control leaves the program
    ctx.accounts.protocol_config.exit(&crate::ID)?;

    let deposit = system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.client.to_account_info(),
                to: ctx.accounts.job.to_account_info(),
            },
        ),
        escrow_amount,
    );
    guard::release(&mut ctx.accounts.protocol_config.reentrancy_locked);
    deposit?;

    msg!("Job {} created with {} workers", job_id, worker_count);

    emit!(JobCreated {
        job_id,
        client,
        escrowed_amount: escrow_amount,
        allocated_amount: allocated,
        unallocated_amount: unallocated,
        worker_count,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
