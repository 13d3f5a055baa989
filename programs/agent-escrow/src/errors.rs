//! Error codes for the Agent Escrow program

use anchor_lang::error::{Error, ErrorCode, ERROR_CODE_OFFSET};
use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    // Directory errors
    #[msg("Worker is already registered")]
    AlreadyRegistered,

    #[msg("Job or agent not found")]
    NotFound,

    #[msg("Caller is not allowed to perform this action")]
    Unauthorized,

    // Job errors
    #[msg("Worker and payment arrays must be non-empty, equal length and within the worker limit")]
    InvalidArrayLength,

    #[msg("Escrow amount is below the sum of worker payments")]
    InsufficientFunds,

    #[msg("Operation is not valid for the current status")]
    InvalidStatus,

    #[msg("Worker index is out of range")]
    IndexOutOfRange,

    // Proof errors
    #[msg("Proof was rejected by the verifier")]
    InvalidProof,

    #[msg("Agent accounts for every assigned worker are required")]
    WorkerAccountsRequired,

    // Withdrawal errors
    #[msg("No balance available to withdraw")]
    NoBalance,

    #[msg("Transfer to the agent owner failed")]
    TransferFailed,

    #[msg("A value transfer is already in progress")]
    ReentrancyDetected,

    // Rating errors
    #[msg("Rating must be between 1 and 5")]
    InvalidRating,

    #[msg("Job has already been rated")]
    AlreadyRated,

    // Protocol errors
    #[msg("Protocol is paused")]
    ProtocolPaused,

    // General errors
    #[msg("Invalid input parameter")]
    InvalidInput,

    #[msg("Account is not owned by this program")]
    InvalidAccountOwner,

    #[msg("String too long")]
    StringTooLong,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}

/// Coarse error classes used by clients and indexers to decide whether a
/// failed instruction is worth resubmitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input
    Validation,
    /// Not valid for the current job or protocol state
    State,
    /// Caller lacks the required identity
    Auth,
    /// Unknown job or worker
    NotFound,
    /// Escrow, balance or transfer problem
    Funds,
    /// Already registered, already rated, or a rejected proof
    Duplicate,
}

impl EscrowError {
    pub const ALL: [EscrowError; 19] = [
        EscrowError::AlreadyRegistered,
        EscrowError::NotFound,
        EscrowError::Unauthorized,
        EscrowError::InvalidArrayLength,
        EscrowError::InsufficientFunds,
        EscrowError::InvalidStatus,
        EscrowError::IndexOutOfRange,
        EscrowError::InvalidProof,
        EscrowError::WorkerAccountsRequired,
        EscrowError::NoBalance,
        EscrowError::TransferFailed,
        EscrowError::ReentrancyDetected,
        EscrowError::InvalidRating,
        EscrowError::AlreadyRated,
        EscrowError::ProtocolPaused,
        EscrowError::InvalidInput,
        EscrowError::InvalidAccountOwner,
        EscrowError::StringTooLong,
        EscrowError::ArithmeticOverflow,
    ];

    /// The program error carrying `code`, if any.
    pub fn from_code(code: u32) -> Option<EscrowError> {
        EscrowError::ALL
            .iter()
            .copied()
            .find(|err| u32::from(*err) == code)
    }

    pub fn category(&self) -> ErrorCategory {
        use EscrowError::*;
        match self {
            InvalidArrayLength | InvalidRating | IndexOutOfRange | InvalidInput
            | StringTooLong | WorkerAccountsRequired => ErrorCategory::Validation,
            InvalidStatus | ProtocolPaused | ReentrancyDetected => ErrorCategory::State,
            Unauthorized | InvalidAccountOwner => ErrorCategory::Auth,
            NotFound => ErrorCategory::NotFound,
            InsufficientFunds | NoBalance | TransferFailed | ArithmeticOverflow => {
                ErrorCategory::Funds
            }
            AlreadyRegistered | AlreadyRated | InvalidProof => ErrorCategory::Duplicate,
        }
    }
}

/// Classifies any error a handler can return.
///
/// A job or agent account that does not exist fails Anchor's account
/// checks with `AccountNotInitialized` before a handler runs, so that code
/// is filed under `NotFound` next to `EscrowError::NotFound`. Other
/// framework errors have no category.
pub fn classify(err: &Error) -> Option<ErrorCategory> {
    match err {
        Error::AnchorError(anchor_err) => {
            let code = anchor_err.error_code_number;
            if code == u32::from(ErrorCode::AccountNotInitialized) {
                return Some(ErrorCategory::NotFound);
            }
            if code < ERROR_CODE_OFFSET {
                return None;
            }
            EscrowError::from_code(code).map(|e| e.category())
        }
        Error::ProgramError(_) => None,
    }
}
