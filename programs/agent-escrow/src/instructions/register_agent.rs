//! Register a worker in the directory

use crate::errors::EscrowError;
use crate::events::AgentRegistered;
use crate::state::{Agent, ProtocolConfig};
use crate::utils::access::require_not_paused;
use crate::utils::validation::validate_metadata_uri;
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(worker: Pubkey)]
pub struct RegisterAgent<'info> {
    #[account(
        init_if_needed,
        payer = owner,
        space = Agent::SIZE,
        seeds = [b"agent", worker.as_ref()],
        bump
    )]
    pub agent: Account<'info, Agent>,

    #[account(
        mut,
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// Becomes the agent's owner, the only identity allowed to withdraw
    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RegisterAgent>, worker: Pubkey, metadata_uri: String) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;
    validate_metadata_uri(&metadata_uri)?;

    let agent = &mut ctx.accounts.agent;
    require!(!agent.is_registered(), EscrowError::AlreadyRegistered);

    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();

    agent.worker = worker;
    agent.owner = owner;
    agent.metadata_uri = metadata_uri.clone();
    agent.total_earned = 0;
    agent.available_balance = 0;
    agent.jobs_completed = 0;
    agent.active = true;
    agent.registered_at = clock.unix_timestamp;
    agent.transfer_locked = false;
    agent.bump = ctx.bumps.agent;

    let config = &mut ctx.accounts.protocol_config;
    config.total_agents = config
        .total_agents
        .checked_add(1)
        .ok_or(EscrowError::ArithmeticOverflow)?;

    emit!(AgentRegistered {
        worker,
        owner,
        metadata_uri,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
