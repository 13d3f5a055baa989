//! Client rating of a completed job

use crate::errors::EscrowError;
use crate::events::JobRated;
use crate::instructions::constants::{MAX_RATING, MIN_RATING};
use crate::state::{Job, JobStatus, ProtocolConfig};
use crate::utils::access::require_not_paused;
use anchor_lang::prelude::*;

#[derive(Accounts)]
#[instruction(job_id: u64)]
pub struct RateJob<'info> {
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

    pub client: Signer<'info>,
}

/// Records `rating` once, for the job's client, after completion.
pub fn apply_rating(job: &mut Job, caller: &Pubkey, rating: u8) -> Result<()> {
    require!(job.client == *caller, EscrowError::Unauthorized);
    require!(job.status == JobStatus::Completed, EscrowError::InvalidStatus);
    require!(
        (MIN_RATING..=MAX_RATING).contains(&rating),
        EscrowError::InvalidRating
    );
    require!(!job.is_rated, EscrowError::AlreadyRated);

    job.rating = rating;
    job.is_rated = true;
    Ok(())
}

pub fn handler(ctx: Context<RateJob>, job_id: u64, rating: u8) -> Result<()> {
    require_not_paused(&ctx.accounts.protocol_config)?;

    let client = ctx.accounts.client.key();
    apply_rating(&mut ctx.accounts.job, &client, rating)?;

    emit!(JobRated {
        job_id,
        client,
        rating,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_job(client: Pubkey) -> Job {
        Job {
            job_id: 1,
            client,
            status: JobStatus::Completed,
            ..Default::default()
        }
    }

    #[test]
    fn test_client_rates_once() {
        let client = Pubkey::new_unique();
        let mut job = completed_job(client);

        apply_rating(&mut job, &client, 4).unwrap();
        assert_eq!(job.rating, 4);
        assert!(job.is_rated);

        assert_eq!(
            apply_rating(&mut job, &client, 5).unwrap_err(),
            EscrowError::AlreadyRated.into()
        );
        assert_eq!(job.rating, 4);
    }

    #[test]
    fn test_only_client_may_rate() {
        let mut job = completed_job(Pubkey::new_unique());
        assert_eq!(
            apply_rating(&mut job, &Pubkey::new_unique(), 3).unwrap_err(),
            EscrowError::Unauthorized.into()
        );
    }

    #[test]
    fn test_requires_completed_job() {
        let client = Pubkey::new_unique();
        for status in [JobStatus::Pending, JobStatus::Ongoing] {
            let mut job = Job {
                client,
                status,
                ..Default::default()
            };
            assert_eq!(
                apply_rating(&mut job, &client, 3).unwrap_err(),
                EscrowError::InvalidStatus.into()
            );
        }
    }

    #[test]
    fn test_rating_bounds() {
        let client = Pubkey::new_unique();
        for rating in [0u8, 6, u8::MAX] {
            let mut job = completed_job(client);
            assert_eq!(
                apply_rating(&mut job, &client, rating).unwrap_err(),
                EscrowError::InvalidRating.into()
            );
        }
        for rating in MIN_RATING..=MAX_RATING {
            let mut job = completed_job(client);
            assert!(apply_rating(&mut job, &client, rating).is_ok());
        }
    }
}
