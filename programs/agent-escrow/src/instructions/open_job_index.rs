//! Open the job index of an identity.
//!
//! Permissionless. Every client and every assigned worker needs an open
//! index before `create_job` names them.

use crate::events::JobIndexOpened;
use crate::state::{JobIndex, ProtocolConfig};
use crate::utils::access::require_not_paused;
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(identity: Pubkey)]
pub struct OpenJobIndex<'info> {
    #[account(
        init,
        payer = payer,
        space = JobIndex::SIZE,
        seeds = [b"job_index", identity.as_ref()],
        bump
    )]
    pub job_index: Account<'info, JobIndex>,

    #[account(
        seeds = [b"protocol"],
        bump = protocol_config.bump
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenJobIndex>, identity: Pubkey) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;

    let job_index = &mut ctx.accounts.job_index;
    job_index.identity = identity;
    job_index.job_ids = Vec::new();
    job_index.bump = ctx.bumps.job_index;

    emit!(JobIndexOpened {
        identity,
        payer: ctx.accounts.payer.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
