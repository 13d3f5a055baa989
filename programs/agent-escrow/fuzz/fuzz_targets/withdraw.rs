//! Fuzz target for withdraw
//!
//! Tests invariants:
//! - Only the owner withdraws; an empty balance is rejected
//! - The balance is zero afterwards whatever the transfer outcome
//! - Lifetime earnings are untouched
//! - A re-entrant call during the transfer is rejected and pays nothing
//!
//! Run with: cargo test --release -p agent-escrow-fuzz withdraw

use crate::*;
use proptest::prelude::*;

const WORKER: Identity = [1; 32];
const OWNER: Identity = [0x11; 32];
const STRANGER: Identity = [0x99; 32];

fn settled_ledger(payment: u64) -> SimulatedLedger {
    let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
    ledger.register_agent(OWNER, WORKER, "");
    ledger.create_job([0xC1; 32], &[WORKER], &[payment], payment);
    let job_id = ledger.latest_job_id().unwrap();
    ledger.start_job(job_id);
    ledger.submit_proof(job_id, 0, [1; 32]);
    ledger
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn fuzz_withdraw(input in any::<WithdrawInput>()) {
        let mut ledger = settled_ledger(input.payment);
        let caller = if input.caller_is_owner { OWNER } else { STRANGER };
        let earned = ledger.get_agent(&WORKER).unwrap().total_earned;

        for _ in 0..input.repeat {
            let before = ledger.get_agent(&WORKER).unwrap().clone();
            let wallet_before = ledger.wallets.get(&OWNER).copied().unwrap_or(0);
            let mut nested = None;

            let result = ledger.withdraw_with_transfer(caller, WORKER, |inner, _| {
                if input.reenter {
                    nested = Some(inner.withdraw(caller, WORKER));
                }
                input.transfer_succeeds
            });

            prop_assert!(!result.is_invariant_violation(),
                "Invariant violation: {:?}", result);
            if let Some(nested) = nested {
                prop_assert!(nested.is_error_kind("ReentrancyDetected"), "nested got {:?}", nested);
            }

            let agent = ledger.get_agent(&WORKER).unwrap();
            let wallet = ledger.wallets.get(&OWNER).copied().unwrap_or(0);

            if !input.caller_is_owner {
                prop_assert!(result.is_error_kind("Unauthorized"), "got {:?}", result);
                prop_assert_eq!(agent, &before);
            } else if before.available_balance == 0 {
                prop_assert!(result.is_error_kind("NoBalance"), "got {:?}", result);
            } else if input.transfer_succeeds {
                prop_assert!(result.is_success(), "got {:?}", result);
                prop_assert_eq!(wallet - wallet_before, before.available_balance);
                prop_assert_eq!(agent.available_balance, 0);
            } else {
                prop_assert!(result.is_error_kind("TransferFailed"), "got {:?}", result);
                prop_assert_eq!(agent.available_balance, 0);
                prop_assert_eq!(agent.lamports, before.lamports);
                prop_assert_eq!(wallet, wallet_before);
            }

            prop_assert_eq!(agent.total_earned, earned);
            prop_assert!(!agent.transfer_locked);
            prop_assert!(!ledger.reentrancy_locked);
        }

        let paid = ledger.wallets.get(&OWNER).copied().unwrap_or(0);
        prop_assert!(paid <= input.payment);
        prop_assert!(ledger.check_invariants().is_success());
    }
}
