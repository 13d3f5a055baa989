//! Fuzz target for rate_job
//!
//! Tests invariants:
//! - Only the client rates, only once, only a completed job, only 1 through 5
//! - A recorded rating never changes
//!
//! Run with: cargo test --release -p agent-escrow-fuzz rate_job

use crate::*;
use proptest::prelude::*;

const CLIENT: Identity = [0xC1; 32];
const WORKER: Identity = [1; 32];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_rate_job(input in any::<RateJobInput>()) {
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &[WORKER]);
        ledger.create_job(CLIENT, &[WORKER], &[5], 5);
        let job_id = ledger.latest_job_id().unwrap();
        ledger.start_job(job_id);
        if input.settle_first {
            prop_assert!(ledger.submit_proof(job_id, 0, [1; 32]).is_success());
        }

        let caller = if input.caller_is_client { CLIENT } else { WORKER };
        let mut recorded: Option<u8> = None;

        for rating in input.ratings {
            let result = ledger.rate_job(caller, job_id, rating);
            prop_assert!(!result.is_invariant_violation());

            if !input.caller_is_client {
                prop_assert!(result.is_error_kind("Unauthorized"), "got {:?}", result);
            } else if !input.settle_first {
                prop_assert!(result.is_error_kind("InvalidStatus"), "got {:?}", result);
            } else if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                prop_assert!(result.is_error_kind("InvalidRating"), "got {:?}", result);
            } else if recorded.is_some() {
                prop_assert!(result.is_error_kind("AlreadyRated"), "got {:?}", result);
            } else {
                prop_assert!(result.is_success(), "got {:?}", result);
                recorded = Some(rating);
            }

            let job = ledger.get_job(job_id).unwrap();
            prop_assert_eq!(job.is_rated, recorded.is_some());
            prop_assert_eq!(job.rating, recorded.unwrap_or(0));
            prop_assert_eq!(
                check_rating_immutable(recorded.is_some(), recorded.unwrap_or(0), job.rating),
                RatingInvariantResult::Valid
            );
        }

        prop_assert!(ledger.check_invariants().is_success());
    }
}

#[cfg(test)]
mod edge_cases {
    use super::*;

    #[test]
    fn test_unknown_job_not_found() {
        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        assert!(ledger.rate_job(CLIENT, 42, 3).is_error_kind("NotFound"));
    }

    #[test]
    fn test_rating_boundaries() {
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &[WORKER]);
        ledger.create_job(CLIENT, &[WORKER], &[5], 5);
        ledger.start_job(FIRST_JOB_ID);
        ledger.submit_proof(FIRST_JOB_ID, 0, [1; 32]);

        assert!(ledger.rate_job(CLIENT, FIRST_JOB_ID, 0).is_error_kind("InvalidRating"));
        assert!(ledger.rate_job(CLIENT, FIRST_JOB_ID, 6).is_error_kind("InvalidRating"));
        assert!(ledger.rate_job(CLIENT, FIRST_JOB_ID, 5).is_success());
        assert!(ledger.rate_job(CLIENT, FIRST_JOB_ID, 1).is_error_kind("AlreadyRated"));
    }
}
