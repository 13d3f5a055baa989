//! Fuzz target for random operation sequences across the whole ledger
//!
//! Tests invariants:
//! - Job status only moves forward and never reaches CANCELLED
//! - Ratings never change once recorded
//! - Lamports stay conserved across jobs, agents and owner wallets
//!
//! Also holds the reference lifecycle walkthrough.
//!
//! Run with: cargo test --release -p agent-escrow-fuzz job_lifecycle

use crate::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn fuzz_job_lifecycle(ops in prop::collection::vec(arb_ledger_op(), 1..60)) {
        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);

        for op in ops {
            let before: BTreeMap<u64, (u8, bool, u8)> = ledger
                .jobs
                .iter()
                .map(|(id, job)| (*id, (job.status, job.is_rated, job.rating)))
                .collect();

            let result = apply_op(&mut ledger, &op);
            prop_assert!(!result.is_invariant_violation(),
                "Invariant violation after {:?}: {:?}", op, result);

            for (id, (status, was_rated, rating)) in before {
                let job = &ledger.jobs[&id];
                prop_assert_eq!(
                    check_job_state_transition(status, job.status),
                    JobInvariantResult::Valid
                );
                prop_assert_eq!(
                    check_rating_immutable(was_rated, rating, job.rating),
                    RatingInvariantResult::Valid
                );
            }

            let state = ledger.check_invariants();
            prop_assert!(state.is_success(), "after {:?}: {:?}", op, state);
        }
    }
}
