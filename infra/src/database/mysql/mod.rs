//! MySQL repository implementations.
//!
//! One module per core repository trait. All modules share the sqlx error
//! mapping below so that storage failures surface through the ledger error
//! taxonomy instead of as opaque internals.

pub mod reputation_repository_impl;
pub mod service_repository_impl;
pub mod token_repository_impl;
pub mod transaction_repository_impl;

pub use reputation_repository_impl::MySqlReputationEventRepository;
pub use service_repository_impl::MySqlServiceRepository;
pub use token_repository_impl::MySqlTokenRepository;
pub use transaction_repository_impl::MySqlTransactionRepository;

use mo_core::errors::{DomainError, LedgerError};

/// Map a sqlx error to the domain error taxonomy
///
/// Pool exhaustion is a timeout (the engine treats it as bounded and
/// retriable); connectivity failures are `StorageUnavailable`; anything
/// else (decode errors, constraint violations) is an internal error.
pub(crate) fn map_sqlx_error(context: &str, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::PoolTimedOut => LedgerError::StorageTimeout.into(),
        sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::Tls(_) => {
            LedgerError::StorageUnavailable {
                message: format!("{}: {}", context, e),
            }
            .into()
        }
        other => DomainError::Internal {
            message: format!("{}: {}", context, other),
        },
    }
}

/// Parse a CHAR(36) column into a Uuid
pub(crate) fn parse_uuid(context: &str, value: &str) -> Result<uuid::Uuid, DomainError> {
    uuid::Uuid::parse_str(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", context, e),
    })
}
