//! Fuzz target for submit_proof and settlement
//!
//! Tests invariants:
//! - Only ongoing jobs accept proofs; bad index or rejected proof change nothing
//! - Resubmission before settlement overwrites the hash and credits nothing
//! - Settlement credits exactly the per-worker shares, once
//!
//! Run with: cargo test --release -p agent-escrow-fuzz submit_proof

use crate::*;
use proptest::prelude::*;

fn worker(i: usize) -> Identity {
    [i as u8 + 1; 32]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_submit_proof(input in any::<SubmitProofInput>()) {
        let workers: Vec<Identity> = (0..input.worker_count).map(worker).collect();
        let escrow: u64 = input.payments.iter().sum();
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &workers);

        prop_assert!(ledger.create_job([0xC1; 32], &workers, &input.payments, escrow).is_success());
        let job_id = ledger.latest_job_id().unwrap();
        if input.start_first {
            prop_assert!(ledger.start_job(job_id).is_success());
        }

        for (index, proof_hash) in input.submissions {
            let job_before = ledger.get_job(job_id).unwrap().clone();
            let agents_before = ledger.agents.clone();

            let result = ledger.submit_proof(job_id, index, proof_hash);
            prop_assert!(!result.is_invariant_violation(),
                "Invariant violation: {:?}", result);

            if job_before.status != job_status::ONGOING {
                prop_assert!(result.is_error_kind("InvalidStatus"), "got {:?}", result);
            } else if index >= input.worker_count {
                prop_assert!(result.is_error_kind("IndexOutOfRange"), "got {:?}", result);
            } else if proof_hash == EMPTY_PROOF_HASH {
                prop_assert!(result.is_error_kind("InvalidProof"), "got {:?}", result);
            } else {
                prop_assert!(result.is_success(), "got {:?}", result);
            }

            let job = ledger.get_job(job_id).unwrap();
            if result.is_error() {
                prop_assert_eq!(job, &job_before);
                prop_assert_eq!(&ledger.agents, &agents_before);
                continue;
            }

            prop_assert_eq!(job.proof_hashes[index], proof_hash);
            prop_assert!(job.verified[index]);

            if job.status == job_status::COMPLETED {
                prop_assert_eq!(job.completed_at, ledger.now);
                for (i, w) in workers.iter().enumerate() {
                    let before = agents_before[w].available_balance;
                    let after = ledger.agents[w].available_balance;
                    prop_assert_eq!(after - before, input.payments[i]);
                }
            } else {
                prop_assert_eq!(&ledger.agents, &agents_before);
            }
        }

        prop_assert!(ledger.settlements.get(&job_id).copied().unwrap_or(0) <= 1);
        prop_assert!(ledger.check_invariants().is_success());
    }
}

#[cfg(test)]
mod edge_cases {
    use super::*;

    fn ongoing_job(workers: &[Identity], payments: &[u64]) -> (SimulatedLedger, u64) {
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, workers);
        let escrow = payments.iter().sum();
        ledger.create_job([0xC1; 32], workers, payments, escrow);
        let job_id = ledger.latest_job_id().unwrap();
        ledger.start_job(job_id);
        (ledger, job_id)
    }

    #[test]
    fn test_resubmission_credits_nothing() {
        let (mut ledger, job_id) = ongoing_job(&[worker(0), worker(1)], &[3, 4]);
        assert!(ledger.submit_proof(job_id, 0, [1; 32]).is_success());
        assert!(ledger.submit_proof(job_id, 0, [2; 32]).is_success());

        let job = ledger.get_job(job_id).unwrap();
        assert_eq!(job.status, job_status::ONGOING);
        assert_eq!(job.proof_hashes[0], [2; 32]);
        assert_eq!(ledger.get_agent(&worker(0)).unwrap().available_balance, 0);
    }

    #[test]
    fn test_no_second_settlement() {
        let (mut ledger, job_id) = ongoing_job(&[worker(0)], &[5]);
        assert!(ledger.submit_proof(job_id, 0, [1; 32]).is_success());
        assert!(ledger.submit_proof(job_id, 0, [2; 32]).is_error_kind("InvalidStatus"));
        assert_eq!(ledger.get_agent(&worker(0)).unwrap().available_balance, 5);
        assert_eq!(ledger.settlements[&job_id], 1);
    }

    #[test]
    fn test_duplicate_worker_credited_per_slot() {
        let (mut ledger, job_id) = ongoing_job(&[worker(0), worker(0)], &[2, 3]);
        ledger.submit_proof(job_id, 0, [1; 32]);
        assert!(ledger.submit_proof(job_id, 1, [1; 32]).is_success());

        let agent = ledger.get_agent(&worker(0)).unwrap();
        assert_eq!(agent.available_balance, 5);
        assert_eq!(agent.jobs_completed, 2);
    }

    #[test]
    fn test_custom_verifier_is_consulted() {
        fn only_sevens(hash: &[u8; 32]) -> bool {
            hash.iter().all(|b| *b == 7)
        }
        let (mut ledger, job_id) = ongoing_job(&[worker(0)], &[1]);
        ledger.verifier = only_sevens;

        assert!(ledger.submit_proof(job_id, 0, [1; 32]).is_error_kind("InvalidProof"));
        assert!(ledger.submit_proof(job_id, 0, [7; 32]).is_success());
    }
}
