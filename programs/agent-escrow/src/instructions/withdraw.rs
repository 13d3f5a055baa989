//! Withdraw a worker's credited balance to the agent owner

use crate::events::FundsWithdrawn;
use crate::instructions::lamport_transfer::rent_floor;
use crate::instructions::withdrawal_helpers::withdraw_to_owner;
use crate::state::{Agent, ProtocolConfig};
use crate::utils::access::require_not_paused;
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(worker: Pubkey)]
pub struct Withdraw<'info> {
    #[account(
        mut,
        seeds = [b"agent", worker.as_ref()],
        bump = agent.bump
    )]
    pub agent: Account<'info, Agent>,

    #[account(
        mut,
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// Must be the agent's owner; receives the lamports
    #[account(mut)]
    pub owner: Signer<'info>,
}

/// Sends the whole available balance to the owner. The balance is zeroed
/// and persisted before any lamports move, and both critical-section
/// flags are held until the transfer returns.
pub fn handler(ctx: Context<Withdraw>, worker: Pubkey) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;

    let owner = ctx.accounts.owner.key();
    let agent_rent_floor = rent_floor(ctx.accounts.agent.to_account_info().data_len())?;
    let amount = withdraw_to_owner(
        &mut ctx.accounts.agent,
        &mut ctx.accounts.protocol_config,
        &ctx.accounts.owner.to_account_info(),
        agent_rent_floor,
    )?;

    msg!("Withdrew {} lamports for worker {}", amount, worker);

    emit!(FundsWithdrawn {
        worker,
        owner,
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
