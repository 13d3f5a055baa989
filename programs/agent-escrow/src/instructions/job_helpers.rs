//! Shared helpers for job creation and the lifecycle transitions that
//! precede settlement.

use crate::errors::EscrowError;
use crate::instructions::constants::MAX_WORKERS;
use crate::state::{Job, JobIndex, JobStatus, EMPTY_PROOF_HASH};
use anchor_lang::prelude::*;
use anchor_lang::system_program;

/// Validates the worker assignment of a new job and returns the sum of the
/// per-worker shares.
pub fn validate_job_params(
    assigned_workers: &[Pubkey],
    per_worker_payment: &[u64],
    escrow_amount: u64,
) -> Result<u64> {
    require!(
        !assigned_workers.is_empty()
            && assigned_workers.len() == per_worker_payment.len()
            && assigned_workers.len() <= MAX_WORKERS,
        EscrowError::InvalidArrayLength
    );

    let allocated = per_worker_payment
        .iter()
        .try_fold(0u64, |acc, share| acc.checked_add(*share))
        .ok_or(EscrowError::ArithmeticOverflow)?;

    require!(escrow_amount >= allocated, EscrowError::InsufficientFunds);

    Ok(allocated)
}

/// Initializes a freshly allocated job. Proof slots start empty and
/// unverified, one per worker.
#[allow(clippy::too_many_arguments)]
pub fn init_job_fields(
    job: &mut Job,
    job_id: u64,
    client: Pubkey,
    escrow_amount: u64,
    assigned_workers: Vec<Pubkey>,
    per_worker_payment: Vec<u64>,
    created_at: i64,
    bump: u8,
) {
    let worker_count = assigned_workers.len();

    job.job_id = job_id;
    job.client = client;
    job.escrowed_amount = escrow_amount;
    job.created_at = created_at;
    job.completed_at = 0;
    job.assigned_workers = assigned_workers;
    job.per_worker_payment = per_worker_payment;
    job.status = JobStatus::Pending;
    job.rating = 0;
    job.is_rated = false;
    job.proof_hashes = vec![EMPTY_PROOF_HASH; worker_count];
    job.verified = vec![false; worker_count];
    job.bump = bump;
}

/// Pending -> Ongoing. Anyone may start a job.
pub fn start(job: &mut Job) -> Result<()> {
    require!(
        job.status.can_transition_to(JobStatus::Ongoing),
        EscrowError::InvalidStatus
    );
    job.status = JobStatus::Ongoing;
    Ok(())
}

/// Grows a job index account so it can hold `job_count` ids, moving any
/// extra rent from `payer`. A no-op when the account is already large
/// enough.
pub fn ensure_index_capacity<'info>(
    index: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program_info: &AccountInfo<'info>,
    job_count: usize,
) -> Result<()> {
    let needed = JobIndex::space_for(job_count);
    if index.data_len() >= needed {
        return Ok(());
    }

    let rent_due = Rent::get()?
        .minimum_balance(needed)
        .saturating_sub(index.lamports());
    if rent_due > 0 {
        system_program::transfer(
            CpiContext::new(
                system_program_info.clone(),
                system_program::Transfer {
                    from: payer.clone(),
                    to: index.clone(),
                },
            ),
            rent_due,
        )?;
    }
    index.resize(needed)?;
    Ok(())
}

/// Appends `job_id` to a worker's index passed through remaining accounts.
///
/// The index must already exist (opened by `open_job_index`) and belong to
/// `worker`.
pub fn record_in_worker_index<'info>(
    info: &AccountInfo<'info>,
    worker: &Pubkey,
    job_id: u64,
    payer: &AccountInfo<'info>,
    system_program_info: &AccountInfo<'info>,
) -> Result<()> {
    require!(!info.data_is_empty(), EscrowError::WorkerAccountsRequired);
    require!(
        info.owner == &crate::ID,
        EscrowError::InvalidAccountOwner
    );
    require!(info.is_writable, EscrowError::InvalidInput);

    let mut index = {
        let data = info.try_borrow_data()?;
        JobIndex::try_deserialize(&mut &data[..])?
    };
    require!(index.identity == *worker, EscrowError::InvalidInput);

    if !index.record(job_id) {
        return Ok(());
    }
    ensure_index_capacity(info, payer, system_program_info, index.job_ids.len())?;

    let mut data = info.try_borrow_mut_data()?;
    // Skip the 8-byte discriminator
    AnchorSerialize::serialize(&index, &mut &mut data[8..])?;
    Ok(())
}

/// Records a new job in the client's loaded index and in the index of
/// every assigned worker, passed as `worker_indexes` in assignment order.
///
/// A client that names itself as a worker passes its own index again; the
/// loaded copy is the one written back at exit, so that slot is recorded
/// through it.
pub fn index_job<'info>(
    client_index: &mut Account<'info, JobIndex>,
    client: &Pubkey,
    assigned_workers: &[Pubkey],
    worker_indexes: &[AccountInfo<'info>],
    payer: &AccountInfo<'info>,
    system_program_info: &AccountInfo<'info>,
    job_id: u64,
) -> Result<()> {
    require!(
        worker_indexes.len() >= assigned_workers.len(),
        EscrowError::WorkerAccountsRequired
    );

    client_index.record(job_id);
    let client_index_key = client_index.key();

    for (worker, info) in assigned_workers.iter().zip(worker_indexes.iter()) {
        if info.key() == client_index_key {
            require!(worker == client, EscrowError::InvalidInput);
            client_index.record(job_id);
        } else {
            record_in_worker_index(info, worker, job_id, payer, system_program_info)?;
        }
    }

    ensure_index_capacity(
        &client_index.to_account_info(),
        payer,
        system_program_info,
        client_index.job_ids.len(),
    )
}
