//! Initialize protocol configuration

use crate::events::ProtocolInitialized;
use crate::instructions::constants::FIRST_JOB_ID;
use crate::state::ProtocolConfig;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct InitializeProtocol<'info> {
    #[account(
        init,
        payer = authority,
        space = ProtocolConfig::SIZE,
        seeds = [b"protocol"],
        bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// Becomes the designated owner
    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeProtocol>) -> Result<()> {
    let config = &mut ctx.accounts.protocol_config;
    config.authority = ctx.accounts.authority.key();
    config.paused = false;
    config.reentrancy_locked = false;
    config.next_job_id = FIRST_JOB_ID;
    config.total_agents = 0;
    config.total_jobs = 0;
    config.completed_jobs = 0;
    config.total_value_distributed = 0;
    config.total_withdrawn = 0;
    config.bump = ctx.bumps.protocol_config;

    msg!("Protocol initialized, owner {}", config.authority);

    emit!(ProtocolInitialized {
        authority: config.authority,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
