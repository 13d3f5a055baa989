//! Read-only queries. Each returns its result through return data.

use crate::state::{Agent, Job, JobIndex};
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(job_id: u64)]
pub struct GetJob<'info> {
    #[account(
        seeds = [b"job", job_id.to_le_bytes().as_ref()],
        bump = job.bump
    )]
    pub job: Account<'info, Job>,
}

#[derive(Accounts)]
#[instruction(worker: Pubkey)]
pub struct GetAgent<'info> {
    #[account(
        seeds = [b"agent", worker.as_ref()],
        bump = agent.bump
    )]
    pub agent: Account<'info, Agent>,
}

#[derive(Accounts)]
#[instruction(identity: Pubkey)]
pub struct ListJobs<'info> {
    #[account(
        seeds = [b"job_index", identity.as_ref()],
        bump = job_index.bump
    )]
    pub job_index: Account<'info, JobIndex>,
}

pub fn get_job_handler(ctx: Context<GetJob>) -> Result<Job> {
    Ok(Job::clone(&ctx.accounts.job))
}

pub fn get_agent_handler(ctx: Context<GetAgent>) -> Result<Agent> {
    Ok(Agent::clone(&ctx.accounts.agent))
}

/// One page of the job ids recorded for the identity, oldest first.
/// Pages past the end are empty.
pub fn list_jobs_handler(ctx: Context<ListJobs>, page: u32) -> Result<Vec<u64>> {
    Ok(ctx.accounts.job_index.page(page))
}
