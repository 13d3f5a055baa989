//! Arbitrary input generators for fuzz testing
//!
//! Generates random inputs, biased towards the edges the ledger checks.

use proptest::prelude::*;

use crate::scenarios::{Identity, MAX_WORKERS, PROTOCOL_OWNER};

/// Arbitrary 32-byte identity
pub fn arb_identity() -> impl Strategy<Value = Identity> {
    prop::array::uniform32(any::<u8>())
}

/// Identity drawn from a small pool so operations collide on the same
/// accounts.
pub fn arb_pooled_identity() -> impl Strategy<Value = Identity> {
    (1u8..=6u8).prop_map(|n| [n; 32])
}

/// Proof hash, including the all-zero hash the verifier rejects
pub fn arb_proof_hash() -> impl Strategy<Value = [u8; 32]> {
    prop_oneof![
        1 => Just([0u8; 32]),
        9 => prop::array::uniform32(any::<u8>()),
    ]
}

/// Per-worker payment with edge cases
pub fn arb_payment() -> impl Strategy<Value = u64> {
    prop_oneof![
        Just(0u64),
        Just(1u64),
        Just(u64::MAX),
        Just(u64::MAX / 2),
        1_000u64..1_000_000u64,
        1_000_000u64..1_000_000_000u64,
    ]
}

/// Escrow deposit: usually near the allocated sum, sometimes far from it
pub fn arb_escrow(allocated: u64) -> impl Strategy<Value = u64> {
    prop_oneof![
        Just(allocated),
        Just(allocated.saturating_sub(1)),
        Just(allocated.saturating_add(1)),
        allocated..=allocated.saturating_add(1_000_000),
        any::<u64>(),
    ]
}

/// Worker count around the limits (0 and MAX_WORKERS + 1 are invalid)
pub fn arb_worker_count() -> impl Strategy<Value = usize> {
    prop_oneof![
        Just(0usize),
        Just(1usize),
        Just(MAX_WORKERS),
        Just(MAX_WORKERS + 1),
        1usize..=MAX_WORKERS,
    ]
}

/// Rating including out-of-range values
pub fn arb_rating() -> impl Strategy<Value = u8> {
    prop_oneof![
        Just(0u8),
        Just(1u8),
        Just(5u8),
        Just(6u8),
        Just(u8::MAX),
        1u8..=5u8,
    ]
}

/// Input for create_job fuzz testing
#[derive(Debug, Clone)]
pub struct CreateJobInput {
    pub client: Identity,
    pub assigned_workers: Vec<Identity>,
    pub per_worker_payment: Vec<u64>,
    pub escrow_amount: u64,
}

impl Arbitrary for CreateJobInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (arb_identity(), arb_worker_count(), arb_worker_count())
            .prop_flat_map(|(client, workers, payments)| {
                (
                    Just(client),
                    prop::collection::vec(arb_pooled_identity(), workers),
                    prop::collection::vec(arb_payment(), payments),
                )
            })
            .prop_flat_map(|(client, assigned_workers, per_worker_payment)| {
                let allocated = per_worker_payment
                    .iter()
                    .fold(0u64, |acc, share| acc.saturating_add(*share));
                (
                    Just(client),
                    Just(assigned_workers),
                    Just(per_worker_payment),
                    arb_escrow(allocated),
                )
            })
            .prop_map(|(client, assigned_workers, per_worker_payment, escrow_amount)| {
                CreateJobInput {
                    client,
                    assigned_workers,
                    per_worker_payment,
                    escrow_amount,
                }
            })
            .boxed()
    }
}

/// Input for submit_proof fuzz testing
#[derive(Debug, Clone)]
pub struct SubmitProofInput {
    pub worker_count: usize,
    pub payments: Vec<u64>,
    /// Sequence of (worker index, proof hash) submissions
    pub submissions: Vec<(usize, [u8; 32])>,
    pub start_first: bool,
}

impl Arbitrary for SubmitProofInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (1usize..=MAX_WORKERS)
            .prop_flat_map(|worker_count| {
                (
                    Just(worker_count),
                    prop::collection::vec(0u64..1_000_000u64, worker_count),
                    prop::collection::vec((0usize..=worker_count, arb_proof_hash()), 0..24),
                    prop::bool::weighted(0.9),
                )
            })
            .prop_map(|(worker_count, payments, submissions, start_first)| SubmitProofInput {
                worker_count,
                payments,
                submissions,
                start_first,
            })
            .boxed()
    }
}

/// Input for withdraw fuzz testing
#[derive(Debug, Clone)]
pub struct WithdrawInput {
    pub payment: u64,
    pub caller_is_owner: bool,
    pub transfer_succeeds: bool,
    pub reenter: bool,
    pub repeat: u8,
}

impl Arbitrary for WithdrawInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            arb_payment(),
            prop::bool::weighted(0.8),
            prop::bool::weighted(0.8),
            any::<bool>(),
            1u8..=3u8,
        )
            .prop_map(|(payment, caller_is_owner, transfer_succeeds, reenter, repeat)| {
                WithdrawInput {
                    payment,
                    caller_is_owner,
                    transfer_succeeds,
                    reenter,
                    repeat,
                }
            })
            .boxed()
    }
}

/// Input for rate_job fuzz testing
#[derive(Debug, Clone)]
pub struct RateJobInput {
    pub ratings: Vec<u8>,
    pub caller_is_client: bool,
    pub settle_first: bool,
}

impl Arbitrary for RateJobInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(arb_rating(), 1..5),
            prop::bool::weighted(0.8),
            prop::bool::weighted(0.8),
        )
            .prop_map(|(ratings, caller_is_client, settle_first)| RateJobInput {
                ratings,
                caller_is_client,
                settle_first,
            })
            .boxed()
    }
}

/// One step of a random operation sequence
#[derive(Debug, Clone)]
pub enum LedgerOp {
    Register { caller: Identity, worker: Identity },
    CreateJob { client: Identity, workers: Vec<Identity>, payments: Vec<u64>, surplus: u64 },
    Start { job_slot: u8 },
    Submit { job_slot: u8, worker_index: usize, proof_hash: [u8; 32] },
    Withdraw { caller: Identity, worker: Identity, transfer_succeeds: bool },
    Rate { caller: Identity, job_slot: u8, rating: u8 },
    SetPaused { caller: Identity, paused: bool },
}

pub fn arb_ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        2 => (arb_pooled_identity(), arb_pooled_identity())
            .prop_map(|(caller, worker)| LedgerOp::Register { caller, worker }),
        3 => (
            arb_pooled_identity(),
            prop::collection::vec((arb_pooled_identity(), 0u64..1_000u64), 1..=4),
            0u64..100u64,
        )
            .prop_map(|(client, assignment, surplus)| {
                let (workers, payments) = assignment.into_iter().unzip();
                LedgerOp::CreateJob { client, workers, payments, surplus }
            }),
        2 => any::<u8>().prop_map(|job_slot| LedgerOp::Start { job_slot }),
        4 => (any::<u8>(), 0usize..5usize, arb_proof_hash())
            .prop_map(|(job_slot, worker_index, proof_hash)| LedgerOp::Submit {
                job_slot,
                worker_index,
                proof_hash,
            }),
        2 => (arb_pooled_identity(), arb_pooled_identity(), prop::bool::weighted(0.8))
            .prop_map(|(caller, worker, transfer_succeeds)| LedgerOp::Withdraw {
                caller,
                worker,
                transfer_succeeds,
            }),
        1 => (arb_pooled_identity(), any::<u8>(), arb_rating())
            .prop_map(|(caller, job_slot, rating)| LedgerOp::Rate { caller, job_slot, rating }),
        1 => (prop_oneof![Just(PROTOCOL_OWNER), arb_pooled_identity()], any::<bool>())
            .prop_map(|(caller, paused)| LedgerOp::SetPaused { caller, paused }),
    ]
}
