//! Settlement: completes a fully verified job and credits every worker.
//!
//! Runs inside the `submit_proof` call that records the last missing
//! proof, so a job settles exactly once and either every worker is
//! credited or the whole instruction fails.

use crate::errors::EscrowError;
use crate::events::PaymentDistributed;
use crate::instructions::lamport_transfer::transfer_above_rent;
use crate::state::{Agent, Job, JobStatus, ProtocolConfig};
use anchor_lang::prelude::*;

/// One worker's share of a settled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub worker: Pubkey,
    pub amount: u64,
}

/// Moves the job to `Completed` and returns the payouts in assignment
/// order.
pub fn complete_job(job: &mut Job, completed_at: i64) -> Result<Vec<Payout>> {
    require!(
        job.status.can_transition_to(JobStatus::Completed) && job.all_verified(),
        EscrowError::InvalidStatus
    );

    job.status = JobStatus::Completed;
    job.completed_at = completed_at;

    Ok(job
        .assigned_workers
        .iter()
        .zip(job.per_worker_payment.iter())
        .map(|(worker, amount)| Payout {
            worker: *worker,
            amount: *amount,
        })
        .collect())
}

/// Credits one share to an agent's withdrawable balance and lifetime
/// earnings.
pub fn credit_agent(agent: &mut Agent, amount: u64) -> Result<()> {
    agent.available_balance = agent
        .available_balance
        .checked_add(amount)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    agent.total_earned = agent
        .total_earned
        .checked_add(amount)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    agent.jobs_completed = agent
        .jobs_completed
        .checked_add(1)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    Ok(())
}

pub fn record_settlement(config: &mut ProtocolConfig, total_paid: u64) -> Result<()> {
    config.completed_jobs = config
        .completed_jobs
        .checked_add(1)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    config.total_value_distributed = config
        .total_value_distributed
        .checked_add(total_paid)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    Ok(())
}

/// Settles `job` against the agent accounts passed as remaining accounts,
/// one per assigned worker in assignment order. Returns the total paid.
///
/// Each agent record is updated before its share leaves the job account,
/// and the job account never drops below `job_rent_floor`.
pub fn settle_job<'info>(
    job: &mut Account<'info, Job>,
    agent_accounts: &[AccountInfo<'info>],
    timestamp: i64,
    job_rent_floor: u64,
) -> Result<u64> {
    require!(
        agent_accounts.len() >= job.worker_count(),
        EscrowError::WorkerAccountsRequired
    );

    let job_id = job.job_id;
    let payouts = complete_job(job, timestamp)?;

    let job_info = job.to_account_info();
    let mut total_paid: u64 = 0;

    for (payout, agent_info) in payouts.iter().zip(agent_accounts.iter()) {
        credit_agent_account(agent_info, payout)?;
        transfer_above_rent(&job_info, agent_info, payout.amount, job_rent_floor)?;

        total_paid = total_paid
            .checked_add(payout.amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        emit!(PaymentDistributed {
            job_id,
            worker: payout.worker,
            amount: payout.amount,
            timestamp,
        });
    }

    Ok(total_paid)
}

/// Deserializes, credits and writes back the agent record for `payout`.
/// A worker without an agent record cannot be paid, which blocks
/// settlement.
fn credit_agent_account(info: &AccountInfo, payout: &Payout) -> Result<()> {
    require!(!info.data_is_empty(), EscrowError::NotFound);
    require!(
        info.owner == &crate::ID,
        EscrowError::InvalidAccountOwner
    );
    require!(info.is_writable, EscrowError::InvalidInput);

    let mut data = info.try_borrow_mut_data()?;
    let mut agent = Agent::try_deserialize(&mut &data[..])?;
    require!(agent.worker == payout.worker, EscrowError::InvalidInput);

    credit_agent(&mut agent, payout.amount)?;

    // Skip the 8-byte discriminator
    AnchorSerialize::serialize(&agent, &mut &mut data[8..])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::job_helpers::init_job_fields;
    use crate::instructions::test_accounts::{load, TestAccount};

    const FLOOR: u64 = 1_000;

    fn registered(worker: Pubkey) -> TestAccount {
        let agent = Agent {
            worker,
            owner: Pubkey::new_unique(),
            active: true,
            ..Default::default()
        };
        TestAccount::program_owned(&agent, Agent::SIZE, FLOOR)
    }

    fn verified_job(shares: &[u64]) -> Job {
        let mut job = Job::default();
        let assigned = shares.iter().map(|_| Pubkey::new_unique()).collect();
        let escrow = shares.iter().sum();
        init_job_fields(&mut job, 3, Pubkey::new_unique(), escrow, assigned, shares.to_vec(), 10, 255);
        job.status = JobStatus::Ongoing;
        job.verified = vec![true; shares.len()];
        job
    }

    #[test]
    fn test_complete_job_returns_payouts_in_order() {
        let mut job = verified_job(&[30, 70]);
        let payouts = complete_job(&mut job, 99).unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.completed_at, 99);
        assert_eq!(payouts.len(), 2);
        assert_eq!(payouts[0].worker, job.assigned_workers[0]);
        assert_eq!(payouts[0].amount, 30);
        assert_eq!(payouts[1].amount, 70);
    }

    #[test]
    fn test_complete_job_only_once() {
        let mut job = verified_job(&[5]);
        complete_job(&mut job, 1).unwrap();
        assert_eq!(
            complete_job(&mut job, 2).unwrap_err(),
            EscrowError::InvalidStatus.into()
        );
        assert_eq!(job.completed_at, 1);
    }

    #[test]
    fn test_complete_job_requires_all_proofs() {
        let mut job = verified_job(&[5, 5]);
        job.verified[1] = false;
        assert_eq!(
            complete_job(&mut job, 1).unwrap_err(),
            EscrowError::InvalidStatus.into()
        );
        assert_eq!(job.status, JobStatus::Ongoing);
    }

    #[test]
    fn test_credit_agent_accumulates() {
        let mut agent = Agent::default();
        credit_agent(&mut agent, 30).unwrap();
        credit_agent(&mut agent, 20).unwrap();

        assert_eq!(agent.available_balance, 50);
        assert_eq!(agent.total_earned, 50);
        assert_eq!(agent.jobs_completed, 2);
    }

    #[test]
    fn test_credit_agent_overflow() {
        let mut agent = Agent {
            available_balance: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            credit_agent(&mut agent, 1).unwrap_err(),
            EscrowError::ArithmeticOverflow.into()
        );
    }

    #[test]
    fn test_record_settlement_updates_stats() {
        let mut config = ProtocolConfig::default();
        record_settlement(&mut config, 100).unwrap();
        record_settlement(&mut config, 5).unwrap();
        assert_eq!(config.completed_jobs, 2);
        assert_eq!(config.total_value_distributed, 105);
    }

    #[test]
    fn test_settle_job_credits_and_pays_each_agent() {
        let job_state = verified_job(&[30, 70]);
        let workers = job_state.assigned_workers.clone();
        let mut job_acc = TestAccount::program_owned(&job_state, Job::SIZE, FLOOR + 105);
        let mut a0 = registered(workers[0]);
        let mut a1 = registered(workers[1]);

        let job_info = job_acc.info();
        let mut job = Account::<Job>::try_from(&job_info).unwrap();
        let agents = [a0.info(), a1.info()];

        let total = settle_job(&mut job, &agents, 42, FLOOR).unwrap();

        assert_eq!(total, 100);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.completed_at, 42);
        // Surplus stays with the job
        assert_eq!(job_info.lamports(), FLOOR + 5);
        assert_eq!(agents[0].lamports(), FLOOR + 30);
        assert_eq!(agents[1].lamports(), FLOOR + 70);

        let credited: Agent = load(&agents[1]);
        assert_eq!(credited.available_balance, 70);
        assert_eq!(credited.total_earned, 70);
        assert_eq!(credited.jobs_completed, 1);
    }

    #[test]
    fn test_settle_job_rejects_mismatched_agent() {
        let job_state = verified_job(&[10]);
        let mut job_acc = TestAccount::program_owned(&job_state, Job::SIZE, FLOOR + 10);
        let mut stranger = registered(Pubkey::new_unique());

        let job_info = job_acc.info();
        let mut job = Account::<Job>::try_from(&job_info).unwrap();
        let agents = [stranger.info()];

        assert_eq!(
            settle_job(&mut job, &agents, 1, FLOOR).unwrap_err(),
            EscrowError::InvalidInput.into()
        );
        assert_eq!(agents[0].lamports(), FLOOR);
        assert_eq!(load::<Agent>(&agents[0]).available_balance, 0);
    }

    #[test]
    fn test_settle_job_unregistered_worker_is_not_found() {
        let job_state = verified_job(&[10]);
        let mut job_acc = TestAccount::program_owned(&job_state, Job::SIZE, FLOOR + 10);
        let mut missing = TestAccount::wallet(0);

        let job_info = job_acc.info();
        let mut job = Account::<Job>::try_from(&job_info).unwrap();
        let agents = [missing.info()];

        assert_eq!(
            settle_job(&mut job, &agents, 1, FLOOR).unwrap_err(),
            EscrowError::NotFound.into()
        );
        assert_eq!(job_info.lamports(), FLOOR + 10);
    }

    #[test]
    fn test_settle_job_needs_every_agent_account() {
        let job_state = verified_job(&[10, 10]);
        let mut job_acc = TestAccount::program_owned(&job_state, Job::SIZE, FLOOR + 20);
        let mut only = registered(job_state.assigned_workers[0]);

        let job_info = job_acc.info();
        let mut job = Account::<Job>::try_from(&job_info).unwrap();
        let agents = [only.info()];

        assert_eq!(
            settle_job(&mut job, &agents, 1, FLOOR).unwrap_err(),
            EscrowError::WorkerAccountsRequired.into()
        );
        assert_eq!(job.status, JobStatus::Ongoing);
    }

    #[test]
    fn test_settle_job_keeps_job_rent() {
        let job_state = verified_job(&[10]);
        let mut job_acc = TestAccount::program_owned(&job_state, Job::SIZE, FLOOR + 9);
        let mut agent = registered(job_state.assigned_workers[0]);

        let job_info = job_acc.info();
        let mut job = Account::<Job>::try_from(&job_info).unwrap();
        let agents = [agent.info()];

        assert_eq!(
            settle_job(&mut job, &agents, 1, FLOOR).unwrap_err(),
            EscrowError::TransferFailed.into()
        );
        assert_eq!(job_info.lamports(), FLOOR + 9);
    }
}
