//! Ledger invariant checking for fuzz testing

/// Settlement invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementInvariantResult {
    Valid,
    /// Credited total differs from the sum of the per-worker shares
    CreditMismatch { expected: u64, credited: u64 },
    /// A job was settled more than once
    DoubleSettlement { job_id: u64, settlements: u32 },
    /// A completed job carries no completion timestamp
    MissingCompletionTime { job_id: u64 },
}

/// Job state machine invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobInvariantResult {
    Valid,
    InvalidStateTransition { from: u8, to: u8 },
    ArraysMisaligned { workers: usize, payments: usize, hashes: usize, flags: usize },
    WorkerCountOutOfRange { count: usize },
    UnderfundedEscrow { escrowed: u64, allocated: u64 },
}

/// Rating invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingInvariantResult {
    Valid,
    RatedBeforeCompletion { status: u8 },
    OutOfRange { rating: u8 },
    RatingChanged { before: u8, after: u8 },
}

/// Withdrawal invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalInvariantResult {
    Valid,
    BalanceNotZeroed { balance: u64 },
    EarningsChanged { before: u64, after: u64 },
    OverPaid { paid: u64, withdrawn: u64 },
    TokenHeld,
}

/// Value accounting invariant results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerInvariantResult {
    Valid,
    /// Deposited lamports differ from what the accounts and wallets hold
    LamportsNotConserved { deposited: u64, accounted: u64 },
    /// An agent owes more than its account holds
    BalanceExceedsLamports { balance: u64, lamports: u64 },
}

/// Job status values (mirrors JobStatus in state.rs)
pub mod job_status {
    pub const PENDING: u8 = 0;
    pub const ONGOING: u8 = 1;
    pub const COMPLETED: u8 = 2;
    pub const CANCELLED: u8 = 3;
}

// ============================================================================
// Job Invariants
// ============================================================================

/// Status only moves forward: PENDING -> ONGOING -> COMPLETED.
/// Staying in place is always allowed.
pub fn check_job_state_transition(from: u8, to: u8) -> JobInvariantResult {
    use job_status::*;

    let valid = from == to || matches!((from, to), (PENDING, ONGOING) | (ONGOING, COMPLETED));
    if valid {
        JobInvariantResult::Valid
    } else {
        JobInvariantResult::InvalidStateTransition { from, to }
    }
}

/// The four per-worker vectors share one length in `1..=max_workers`.
pub fn check_array_alignment(
    workers: usize,
    payments: usize,
    hashes: usize,
    flags: usize,
    max_workers: usize,
) -> JobInvariantResult {
    if workers != payments || workers != hashes || workers != flags {
        return JobInvariantResult::ArraysMisaligned {
            workers,
            payments,
            hashes,
            flags,
        };
    }
    if workers == 0 || workers > max_workers {
        return JobInvariantResult::WorkerCountOutOfRange { count: workers };
    }
    JobInvariantResult::Valid
}

pub fn check_escrow_covers_shares(escrowed: u64, payments: &[u64]) -> JobInvariantResult {
    let allocated = payments
        .iter()
        .try_fold(0u64, |acc, share| acc.checked_add(*share));
    match allocated {
        Some(allocated) if allocated <= escrowed => JobInvariantResult::Valid,
        Some(allocated) => JobInvariantResult::UnderfundedEscrow { escrowed, allocated },
        None => JobInvariantResult::UnderfundedEscrow {
            escrowed,
            allocated: u64::MAX,
        },
    }
}

// ============================================================================
// Settlement Invariants
// ============================================================================

/// Credited total equals the sum of the shares.
pub fn check_settlement_credit(expected: u64, credited: u64) -> SettlementInvariantResult {
    if expected == credited {
        SettlementInvariantResult::Valid
    } else {
        SettlementInvariantResult::CreditMismatch { expected, credited }
    }
}

pub fn check_single_settlement(job_id: u64, settlements: u32) -> SettlementInvariantResult {
    if settlements <= 1 {
        SettlementInvariantResult::Valid
    } else {
        SettlementInvariantResult::DoubleSettlement {
            job_id,
            settlements,
        }
    }
}

pub fn check_completion_time(job_id: u64, status: u8, completed_at: i64) -> SettlementInvariantResult {
    if status == job_status::COMPLETED && completed_at == 0 {
        SettlementInvariantResult::MissingCompletionTime { job_id }
    } else {
        SettlementInvariantResult::Valid
    }
}

// ============================================================================
// Rating Invariants
// ============================================================================

pub fn check_rating_state(
    status: u8,
    is_rated: bool,
    rating: u8,
    min_rating: u8,
    max_rating: u8,
) -> RatingInvariantResult {
    if !is_rated {
        return RatingInvariantResult::Valid;
    }
    if status != job_status::COMPLETED {
        return RatingInvariantResult::RatedBeforeCompletion { status };
    }
    if rating < min_rating || rating > max_rating {
        return RatingInvariantResult::OutOfRange { rating };
    }
    RatingInvariantResult::Valid
}

/// A recorded rating never changes.
pub fn check_rating_immutable(was_rated: bool, before: u8, after: u8) -> RatingInvariantResult {
    if was_rated && before != after {
        RatingInvariantResult::RatingChanged { before, after }
    } else {
        RatingInvariantResult::Valid
    }
}

// ============================================================================
// Withdrawal Invariants
// ============================================================================

/// After a withdrawal the balance is zero whatever the transfer outcome,
/// lifetime earnings are untouched and the token is released.
pub fn check_withdrawal(
    balance_after: u64,
    earned_before: u64,
    earned_after: u64,
    token_held: bool,
) -> WithdrawalInvariantResult {
    if balance_after != 0 {
        return WithdrawalInvariantResult::BalanceNotZeroed {
            balance: balance_after,
        };
    }
    if earned_before != earned_after {
        return WithdrawalInvariantResult::EarningsChanged {
            before: earned_before,
            after: earned_after,
        };
    }
    if token_held {
        return WithdrawalInvariantResult::TokenHeld;
    }
    WithdrawalInvariantResult::Valid
}

/// An owner never receives more than the balance that was withdrawn.
pub fn check_no_overpayment(paid: u64, withdrawn: u64) -> WithdrawalInvariantResult {
    if paid > withdrawn {
        WithdrawalInvariantResult::OverPaid { paid, withdrawn }
    } else {
        WithdrawalInvariantResult::Valid
    }
}

// ============================================================================
// Value Accounting
// ============================================================================

/// Every deposited lamport sits in a job account, an agent account or an
/// owner's wallet.
pub fn check_lamport_conservation(
    deposited: u64,
    job_lamports: u64,
    agent_lamports: u64,
    wallet_lamports: u64,
) -> LedgerInvariantResult {
    let accounted = job_lamports
        .checked_add(agent_lamports)
        .and_then(|sum| sum.checked_add(wallet_lamports));
    match accounted {
        Some(accounted) if accounted == deposited => LedgerInvariantResult::Valid,
        Some(accounted) => LedgerInvariantResult::LamportsNotConserved {
            deposited,
            accounted,
        },
        None => LedgerInvariantResult::LamportsNotConserved {
            deposited,
            accounted: u64::MAX,
        },
    }
}

pub fn check_balance_backed(balance: u64, lamports: u64) -> LedgerInvariantResult {
    if balance > lamports {
        LedgerInvariantResult::BalanceExceedsLamports { balance, lamports }
    } else {
        LedgerInvariantResult::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_transitions() {
        use job_status::*;
        assert_eq!(check_job_state_transition(PENDING, ONGOING), JobInvariantResult::Valid);
        assert_eq!(check_job_state_transition(ONGOING, COMPLETED), JobInvariantResult::Valid);
        assert_eq!(check_job_state_transition(COMPLETED, COMPLETED), JobInvariantResult::Valid);

        assert!(matches!(
            check_job_state_transition(PENDING, COMPLETED),
            JobInvariantResult::InvalidStateTransition { .. }
        ));
        assert!(matches!(
            check_job_state_transition(COMPLETED, ONGOING),
            JobInvariantResult::InvalidStateTransition { .. }
        ));
        assert!(matches!(
            check_job_state_transition(ONGOING, CANCELLED),
            JobInvariantResult::InvalidStateTransition { .. }
        ));
    }

    #[test]
    fn test_array_alignment() {
        assert_eq!(check_array_alignment(2, 2, 2, 2, 10), JobInvariantResult::Valid);
        assert!(matches!(
            check_array_alignment(2, 1, 2, 2, 10),
            JobInvariantResult::ArraysMisaligned { .. }
        ));
        assert!(matches!(
            check_array_alignment(0, 0, 0, 0, 10),
            JobInvariantResult::WorkerCountOutOfRange { count: 0 }
        ));
        assert!(matches!(
            check_array_alignment(11, 11, 11, 11, 10),
            JobInvariantResult::WorkerCountOutOfRange { count: 11 }
        ));
    }

    #[test]
    fn test_escrow_covers_shares() {
        assert_eq!(check_escrow_covers_shares(10, &[3, 4]), JobInvariantResult::Valid);
        assert!(matches!(
            check_escrow_covers_shares(6, &[3, 4]),
            JobInvariantResult::UnderfundedEscrow { allocated: 7, .. }
        ));
    }

    #[test]
    fn test_settlement_checks() {
        assert_eq!(check_settlement_credit(7, 7), SettlementInvariantResult::Valid);
        assert!(matches!(
            check_settlement_credit(7, 14),
            SettlementInvariantResult::CreditMismatch { .. }
        ));
        assert_eq!(check_single_settlement(1, 1), SettlementInvariantResult::Valid);
        assert!(matches!(
            check_single_settlement(1, 2),
            SettlementInvariantResult::DoubleSettlement { .. }
        ));
        assert!(matches!(
            check_completion_time(1, job_status::COMPLETED, 0),
            SettlementInvariantResult::MissingCompletionTime { job_id: 1 }
        ));
    }

    #[test]
    fn test_rating_checks() {
        assert_eq!(
            check_rating_state(job_status::COMPLETED, true, 5, 1, 5),
            RatingInvariantResult::Valid
        );
        assert!(matches!(
            check_rating_state(job_status::ONGOING, true, 3, 1, 5),
            RatingInvariantResult::RatedBeforeCompletion { .. }
        ));
        assert!(matches!(
            check_rating_state(job_status::COMPLETED, true, 0, 1, 5),
            RatingInvariantResult::OutOfRange { rating: 0 }
        ));
        assert!(matches!(
            check_rating_immutable(true, 4, 5),
            RatingInvariantResult::RatingChanged { .. }
        ));
        assert_eq!(check_rating_immutable(false, 0, 5), RatingInvariantResult::Valid);
    }

    #[test]
    fn test_withdrawal_checks() {
        assert_eq!(check_withdrawal(0, 50, 50, false), WithdrawalInvariantResult::Valid);
        assert!(matches!(
            check_withdrawal(1, 50, 50, false),
            WithdrawalInvariantResult::BalanceNotZeroed { balance: 1 }
        ));
        assert!(matches!(
            check_withdrawal(0, 50, 0, false),
            WithdrawalInvariantResult::EarningsChanged { .. }
        ));
        assert_eq!(check_withdrawal(0, 50, 50, true), WithdrawalInvariantResult::TokenHeld);
        assert!(matches!(
            check_no_overpayment(100, 50),
            WithdrawalInvariantResult::OverPaid { .. }
        ));
    }

    #[test]
    fn test_lamport_conservation() {
        assert_eq!(check_lamport_conservation(10, 3, 4, 3), LedgerInvariantResult::Valid);
        assert!(matches!(
            check_lamport_conservation(10, 3, 4, 4),
            LedgerInvariantResult::LamportsNotConserved { .. }
        ));
        assert!(matches!(
            check_balance_backed(5, 4),
            LedgerInvariantResult::BalanceExceedsLamports { .. }
        ));
    }
}
