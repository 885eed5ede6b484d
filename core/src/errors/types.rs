//! Ledger error taxonomy for token accounting and exchange operations.
//!
//! Every variant maps to a stable SCREAMING_SNAKE code. The codes are part
//! of the API contract and are also recorded on failed transactions, so
//! clients can audit why a purchase failed.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the token ledger and exchange engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Denomination is not a positive multiple of 15 minutes
    #[error("Invalid denomination: {denomination} minutes (must be a positive multiple of 15)")]
    InvalidDenomination { denomination: i32 },

    /// The caller's full active token set cannot cover the required amount
    #[error("Insufficient funds: {available} minutes available, {required} required")]
    InsufficientFunds { available: i32, required: i32 },

    /// The offered token set sums below the service cost
    #[error("Insufficient payment: {offered} minutes offered, {required} required")]
    InsufficientPayment { offered: i32, required: i32 },

    /// A token in the set is not owned by the sender at commit time
    #[error("Ownership mismatch for token {token_id}")]
    OwnershipMismatch { token_id: Uuid },

    /// A token in the set is inactive or expired
    #[error("Token {token_id} is inactive or expired")]
    TokenInactive { token_id: Uuid },

    /// The submitted token set contains the same token more than once
    #[error("Duplicate token {token_id} in transfer set")]
    DuplicateToken { token_id: Uuid },

    /// The transaction has already started its token transfer, or has
    /// already reached a terminal state
    #[error("Transaction {transaction_id} is already processing")]
    AlreadyProcessing { transaction_id: Uuid },

    /// A storage call exceeded its bounded timeout; treated as failed, not
    /// unknown (the dropped storage transaction rolls back)
    #[error("Storage operation timed out")]
    StorageTimeout,

    /// Storage is unreachable or failing; fatal to the current request
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },
}

impl LedgerError {
    /// Stable error code for API responses and transaction records
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidDenomination { .. } => "INVALID_DENOMINATION",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            LedgerError::OwnershipMismatch { .. } => "OWNERSHIP_MISMATCH",
            LedgerError::TokenInactive { .. } => "TOKEN_INACTIVE",
            LedgerError::DuplicateToken { .. } => "DUPLICATE_TOKEN",
            LedgerError::AlreadyProcessing { .. } => "ALREADY_PROCESSING",
            LedgerError::StorageTimeout => "STORAGE_TIMEOUT",
            LedgerError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }
}
