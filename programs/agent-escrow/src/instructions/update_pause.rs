//! Pause and unpause the protocol (owner only)

use crate::events::ProtocolPauseUpdated;
use crate::state::ProtocolConfig;
use crate::utils::access::set_paused;
use anchor_lang::prelude::*;

#[derive(Accounts)]
pub struct UpdatePause<'info> {
    #[account(
        mut,
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    pub authority: Signer<'info>,
}

/// Sets the pause switch. Exempt from the pause check itself, so a paused
/// protocol can always be resumed.
pub fn handler(ctx: Context<UpdatePause>, paused: bool) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let config = &mut ctx.accounts.protocol_config;
    set_paused(config, &authority, paused)?;

    msg!("Protocol paused: {}", paused);

    emit!(ProtocolPauseUpdated {
        authority,
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
