//! Proof recording for `submit_proof`.

use crate::errors::EscrowError;
use crate::state::{Job, JobStatus, HASH_SIZE};
use crate::utils::verifier::ProofVerifier;
use anchor_lang::prelude::*;

/// Verifies `proof_hash` for the worker at `worker_index` and records it.
///
/// A resubmission overwrites the stored hash; the flag stays set. Returns
/// true once every worker of the job is verified, i.e. the job is ready
/// to settle.
pub fn record_proof<V: ProofVerifier + ?Sized>(
    job: &mut Job,
    worker_index: u8,
    proof_hash: [u8; HASH_SIZE],
    verifier: &V,
) -> Result<bool> {
    require!(job.status == JobStatus::Ongoing, EscrowError::InvalidStatus);

    let index = worker_index as usize;
    require!(index < job.worker_count(), EscrowError::IndexOutOfRange);
    require!(verifier.verify(&proof_hash), EscrowError::InvalidProof);

    job.proof_hashes[index] = proof_hash;
    job.verified[index] = true;

    Ok(job.all_verified())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::job_helpers::init_job_fields;
    use crate::state::EMPTY_PROOF_HASH;
    use crate::utils::verifier::PlaceholderVerifier;

    struct RejectAll;

    impl ProofVerifier for RejectAll {
        fn verify(&self, _proof_hash: &[u8; HASH_SIZE]) -> bool {
            false
        }
    }

    fn ongoing_job(workers: usize) -> Job {
        let mut job = Job::default();
        let assigned = (0..workers).map(|_| Pubkey::new_unique()).collect();
        init_job_fields(&mut job, 1, Pubkey::new_unique(), 100, assigned, vec![10; workers], 0, 255);
        job.status = JobStatus::Ongoing;
        job
    }

    #[test]
    fn test_last_proof_reports_ready() {
        let mut job = ongoing_job(2);
        assert!(!record_proof(&mut job, 0, [1; HASH_SIZE], &PlaceholderVerifier).unwrap());
        assert!(record_proof(&mut job, 1, [2; HASH_SIZE], &PlaceholderVerifier).unwrap());
        assert_eq!(job.proof_hashes, vec![[1; HASH_SIZE], [2; HASH_SIZE]]);
    }

    #[test]
    fn test_resubmission_overwrites_hash() {
        let mut job = ongoing_job(2);
        record_proof(&mut job, 0, [1; HASH_SIZE], &PlaceholderVerifier).unwrap();
        let ready = record_proof(&mut job, 0, [9; HASH_SIZE], &PlaceholderVerifier).unwrap();

        assert!(!ready);
        assert_eq!(job.proof_hashes[0], [9; HASH_SIZE]);
        assert!(job.verified[0]);
        assert!(!job.verified[1]);
    }

    #[test]
    fn test_requires_ongoing() {
        let mut job = ongoing_job(1);
        job.status = JobStatus::Pending;
        assert_eq!(
            record_proof(&mut job, 0, [1; HASH_SIZE], &PlaceholderVerifier).unwrap_err(),
            EscrowError::InvalidStatus.into()
        );

        job.status = JobStatus::Completed;
        assert_eq!(
            record_proof(&mut job, 0, [1; HASH_SIZE], &PlaceholderVerifier).unwrap_err(),
            EscrowError::InvalidStatus.into()
        );
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let mut job = ongoing_job(2);
        assert_eq!(
            record_proof(&mut job, 2, [1; HASH_SIZE], &PlaceholderVerifier).unwrap_err(),
            EscrowError::IndexOutOfRange.into()
        );
    }

    #[test]
    fn test_rejected_proof_leaves_job_untouched() {
        let mut job = ongoing_job(1);
        assert_eq!(
            record_proof(&mut job, 0, EMPTY_PROOF_HASH, &PlaceholderVerifier).unwrap_err(),
            EscrowError::InvalidProof.into()
        );
        assert_eq!(
            record_proof(&mut job, 0, [7; HASH_SIZE], &RejectAll).unwrap_err(),
            EscrowError::InvalidProof.into()
        );
        assert!(!job.verified[0]);
        assert_eq!(job.proof_hashes[0], EMPTY_PROOF_HASH);
    }
}
