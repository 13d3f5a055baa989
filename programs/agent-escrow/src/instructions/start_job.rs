//! Move a pending job to ongoing

use crate::events::JobStarted;
use crate::instructions::job_helpers::start;
use crate::state::{Job, ProtocolConfig};
use crate::utils::access::require_not_paused;
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(job_id: u64)]
pub struct StartJob<'info> {
    #[account(
        mut,
        seeds = [b"job", job_id.to_le_bytes().as_ref()],
        bump = job.bump
    )]
    pub job: Account<'info, Job>,

    #[account(
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// Any signer may start a job
    pub caller: Signer<'info>,
}

pub fn handler(ctx: Context<StartJob>, job_id: u64) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;

    start(&mut ctx.accounts.job)?;

    emit!(JobStarted {
        job_id,
        started_by: ctx.accounts.caller.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
