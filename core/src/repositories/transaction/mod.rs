//! Transaction repository module.

mod r#trait;
pub use r#trait::TransactionRepository;

mod mock;
pub use mock::MockTransactionRepository;
