//! Repository interfaces for ledger persistence.
//!
//! Each module holds the async trait and an in-memory mock used by the
//! service tests. MySQL implementations live in `mo_infra`.

pub mod reputation;
pub mod service;
pub mod token;
pub mod transaction;

pub use reputation::{MockReputationEventRepository, ReputationEventRepository};
pub use service::{MockServiceRepository, ServiceRepository};
pub use token::{MockTokenRepository, TokenRepository};
pub use transaction::{MockTransactionRepository, TransactionRepository};
