//! Fuzz target for create_job
//!
//! Tests invariants:
//! - Worker and payment arrays are non-empty, aligned and bounded
//! - Escrow covers the sum of the shares
//! - A rejected job leaves no trace and does not consume an id
//! - Lamports deposited are accounted for
//!
//! Run with: cargo test --release -p agent-escrow-fuzz create_job

use crate::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_create_job(input in any::<CreateJobInput>()) {
        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        let next_before = ledger.next_job_id;

        let result = ledger.create_job(
            input.client,
            &input.assigned_workers,
            &input.per_worker_payment,
            input.escrow_amount,
        );

        prop_assert!(!result.is_invariant_violation(),
            "Invariant violation: {:?}", result);

        let workers = input.assigned_workers.len();
        let lengths_ok = workers > 0
            && workers == input.per_worker_payment.len()
            && workers <= MAX_WORKERS;
        let allocated = input
            .per_worker_payment
            .iter()
            .try_fold(0u64, |acc, share| acc.checked_add(*share));

        if !lengths_ok {
            prop_assert!(result.is_error_kind("InvalidArrayLength"), "got {:?}", result);
        } else {
            match allocated {
                None => prop_assert!(result.is_error_kind("ArithmeticOverflow"), "got {:?}", result),
                Some(sum) if input.escrow_amount < sum => {
                    prop_assert!(result.is_error_kind("InsufficientFunds"), "got {:?}", result)
                }
                Some(_) => prop_assert!(result.is_success(), "got {:?}", result),
            }
        }

        if result.is_success() {
            let job = ledger.get_job(next_before).expect("job stored under allocated id");
            prop_assert_eq!(job.status, job_status::PENDING);
            prop_assert_eq!(job.escrowed_amount, input.escrow_amount);
            prop_assert_eq!(job.lamports, input.escrow_amount);
            prop_assert_eq!(job.verified.len(), workers);
            prop_assert!(job.proof_hashes.iter().all(|h| *h == EMPTY_PROOF_HASH));
            prop_assert_eq!(ledger.next_job_id, next_before + 1);
            prop_assert_eq!(ledger.list_client_jobs(&input.client, 0), vec![next_before]);
            for worker in &input.assigned_workers {
                prop_assert_eq!(ledger.list_agent_jobs(worker, 0), vec![next_before]);
            }
        } else {
            prop_assert!(ledger.jobs.is_empty());
            prop_assert_eq!(ledger.next_job_id, next_before);
            prop_assert_eq!(ledger.total_deposited, 0);
        }

        prop_assert!(ledger.check_invariants().is_success());
    }

    /// Ids are handed out in order, one per successful creation
    #[test]
    fn fuzz_job_ids_monotonic(inputs in prop::collection::vec(any::<CreateJobInput>(), 1..20)) {
        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        let mut expected = FIRST_JOB_ID;

        for input in inputs {
            let result = ledger.create_job(
                input.client,
                &input.assigned_workers,
                &input.per_worker_payment,
                input.escrow_amount,
            );
            if result.is_success() {
                prop_assert_eq!(ledger.latest_job_id(), Some(expected));
                expected += 1;
            }
            prop_assert_eq!(ledger.next_job_id, expected);
        }
    }
}
