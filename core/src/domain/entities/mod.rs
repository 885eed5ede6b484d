//! Domain entities for the time-token ledger.

pub mod reputation;
pub mod service;
pub mod token;
pub mod transaction;

pub use reputation::ReputationEvent;
pub use service::Service;
pub use token::TimeToken;
pub use transaction::{Transaction, TransactionStatus};
