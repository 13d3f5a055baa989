//! Fuzz test runner for the Agent Escrow program
//!
//! Run with: cargo run --release
//! Or: cargo test (for property-based tests)

use agent_escrow_fuzz::*;
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use std::time::Instant;

fn main() {
    println!("=== Agent Escrow Fuzz Testing ===\n");

    let start = Instant::now();
    let mut total_tests = 0;
    let mut passed = 0;
    let mut failed = 0;

    println!("Running create_job fuzz tests...");
    let (p, f) = run_create_job_fuzz(100);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running submit_proof fuzz tests...");
    let (p, f) = run_submit_proof_fuzz(100);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running withdraw fuzz tests...");
    let (p, f) = run_withdraw_fuzz(100);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running operation sequence tests...");
    let (p, f) = run_sequence_fuzz(50);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running edge case tests...");
    let (p, f) = run_edge_case_tests();
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running reentrancy tests...");
    let (p, f) = run_reentrancy_tests(50);
    passed += p;
    failed += f;
    total_tests += p + f;

    let duration = start.elapsed();

    println!("\n=== Fuzz Testing Complete ===");
    println!("Total tests: {}", total_tests);
    println!("Passed: {}", passed);
    println!("Failed: {}", failed);
    println!("Duration: {:?}", duration);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn run_create_job_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    let mut runner = proptest::test_runner::TestRunner::default();

    for i in 0..iterations {
        let input = any::<CreateJobInput>()
            .new_tree(&mut runner)
            .expect("Failed to generate CreateJobInput")
            .current();

        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        let result = ledger.create_job(
            input.client,
            &input.assigned_workers,
            &input.per_worker_payment,
            input.escrow_amount,
        );
        let state = ledger.check_invariants();

        if result.is_invariant_violation() || !state.is_success() {
            println!("  [FAIL] Iteration {}: {:?} / {:?}", i, result, state);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  create_job: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_submit_proof_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    let mut runner = proptest::test_runner::TestRunner::default();

    for i in 0..iterations {
        let input = any::<SubmitProofInput>()
            .new_tree(&mut runner)
            .expect("Failed to generate SubmitProofInput")
            .current();

        let workers: Vec<Identity> = (0..input.worker_count).map(|w| [w as u8 + 1; 32]).collect();
        let escrow: u64 = input.payments.iter().sum();
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &workers);
        ledger.create_job([0xC1; 32], &workers, &input.payments, escrow);
        if input.start_first {
            ledger.start_job(FIRST_JOB_ID);
        }

        let mut violation = None;
        for (index, proof_hash) in input.submissions {
            let result = ledger.submit_proof(FIRST_JOB_ID, index, proof_hash);
            if result.is_invariant_violation() {
                violation = Some(result);
                break;
            }
        }
        let state = ledger.check_invariants();

        if violation.is_some() || !state.is_success() {
            println!("  [FAIL] Iteration {}: {:?} / {:?}", i, violation, state);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  submit_proof: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_withdraw_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    let mut runner = proptest::test_runner::TestRunner::default();
    let worker: Identity = [1; 32];
    let owner: Identity = [0x11; 32];

    for i in 0..iterations {
        let input = any::<WithdrawInput>()
            .new_tree(&mut runner)
            .expect("Failed to generate WithdrawInput")
            .current();

        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        ledger.register_agent(owner, worker, "");
        ledger.create_job([0xC1; 32], &[worker], &[input.payment], input.payment);
        ledger.start_job(FIRST_JOB_ID);
        ledger.submit_proof(FIRST_JOB_ID, 0, [1; 32]);

        let caller = if input.caller_is_owner { owner } else { [0x99; 32] };
        let mut violation = None;
        for _ in 0..input.repeat {
            let succeeds = input.transfer_succeeds;
            let result = ledger.withdraw_with_transfer(caller, worker, |_, _| succeeds);
            if result.is_invariant_violation() {
                violation = Some(result);
                break;
            }
        }
        let paid = ledger.wallets.get(&owner).copied().unwrap_or(0);
        let state = ledger.check_invariants();

        if violation.is_some() || !state.is_success() || paid > input.payment {
            println!("  [FAIL] Iteration {}: {:?} / {:?} paid={}", i, violation, state, paid);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  withdraw: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_sequence_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    let mut runner = proptest::test_runner::TestRunner::default();

    for i in 0..iterations {
        let ops = prop::collection::vec(arb_ledger_op(), 1..60)
            .new_tree(&mut runner)
            .expect("Failed to generate operation sequence")
            .current();

        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        let mut failure = None;
        for op in &ops {
            let result = apply_op(&mut ledger, op);
            let state = ledger.check_invariants();
            if result.is_invariant_violation() || !state.is_success() {
                failure = Some((op.clone(), result, state));
                break;
            }
        }

        if let Some((op, result, state)) = failure {
            println!("  [FAIL] Iteration {}: {:?} -> {:?} / {:?}", i, op, result, state);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  sequences: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_edge_case_tests() -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    // Shares summing past u64::MAX
    {
        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        let result = ledger.create_job([0xC1; 32], &[[1; 32], [2; 32]], &[u64::MAX, 1], u64::MAX);

        if !result.is_error_kind("ArithmeticOverflow") || !ledger.jobs.is_empty() {
            println!("  [FAIL] share overflow: {:?}", result);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    // u64::MAX payment settles and withdraws in full
    {
        let worker: Identity = [1; 32];
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &[worker]);
        ledger.create_job([0xC1; 32], &[worker], &[u64::MAX], u64::MAX);
        ledger.start_job(FIRST_JOB_ID);
        let settled = ledger.submit_proof(FIRST_JOB_ID, 0, [1; 32]);
        let withdrawn = ledger.withdraw(worker, worker);

        if !settled.is_success()
            || !withdrawn.is_success()
            || ledger.wallets.get(&worker).copied() != Some(u64::MAX)
        {
            println!("  [FAIL] u64::MAX payment: {:?} / {:?}", settled, withdrawn);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    // Worker count one past the limit
    {
        let workers = vec![[1u8; 32]; MAX_WORKERS + 1];
        let payments = vec![1u64; MAX_WORKERS + 1];
        let mut ledger = SimulatedLedger::new(PROTOCOL_OWNER);
        let result = ledger.create_job([0xC1; 32], &workers, &payments, 100);

        if !result.is_error_kind("InvalidArrayLength") {
            println!("  [FAIL] worker limit: {:?}", result);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    // Zero proof hash never verifies
    {
        let worker: Identity = [1; 32];
        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &[worker]);
        ledger.create_job([0xC1; 32], &[worker], &[5], 5);
        ledger.start_job(FIRST_JOB_ID);
        let result = ledger.submit_proof(FIRST_JOB_ID, 0, EMPTY_PROOF_HASH);
        let job_untouched = ledger
            .get_job(FIRST_JOB_ID)
            .map(|job| !job.verified[0])
            .unwrap_or(false);

        if !result.is_error_kind("InvalidProof") || !job_untouched {
            println!("  [FAIL] zero proof hash: {:?}", result);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  edge_cases: {} passed, {} failed", passed, failed);
    (passed, failed)
}

fn run_reentrancy_tests(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    for i in 0..iterations {
        let worker_count = (i % MAX_WORKERS) + 1;
        let workers: Vec<Identity> = (0..worker_count).map(|w| [w as u8 + 1; 32]).collect();
        let payments: Vec<u64> = (0..worker_count).map(|w| (w as u64 + 1) * 1_000).collect();
        let escrow: u64 = payments.iter().sum();

        let mut ledger = SimulatedLedger::with_registered(PROTOCOL_OWNER, &workers);
        ledger.create_job([0xC1; 32], &workers, &payments, escrow);
        ledger.start_job(FIRST_JOB_ID);
        for w in 0..worker_count {
            ledger.submit_proof(FIRST_JOB_ID, w, [0xEE; 32]);
        }

        // The first worker's transfer tries to drain every worker, itself included
        let target = workers[0];
        let mut nested_paid = false;
        let result = ledger.withdraw_with_transfer(target, target, |inner, _| {
            for w in &workers {
                if inner.withdraw(*w, *w).is_success() {
                    nested_paid = true;
                }
            }
            true
        });

        let total_paid: u64 = ledger.wallets.values().sum();
        if !result.is_success()
            || nested_paid
            || total_paid != payments[0]
            || !ledger.check_invariants().is_success()
        {
            println!("  [FAIL] Reentrancy test {}: paid={} of {}", i, total_paid, escrow);
            failed += 1;
        } else {
            passed += 1;
        }
    }

    println!("  reentrancy: {} passed, {} failed", passed, failed);
    (passed, failed)
}
