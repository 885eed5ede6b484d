//! Domain-specific error types and error handling.

mod types;

pub use types::LedgerError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to the ledger error taxonomy
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl DomainError {
    /// Stable error code used in API responses and transaction audit records
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Unauthorized => "UNAUTHORIZED",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Ledger(e) => e.code(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
