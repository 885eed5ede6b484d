//! Transaction repository trait.
//!
//! Every status transition is a compare-and-swap guarded on
//! `status = 'pending'`: the boolean return tells the caller whether it won
//! the transition. Completion and cancellation racing on one transaction
//! therefore resolve to exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::transaction::Transaction;
use crate::errors::DomainError;

/// Repository trait for Transaction persistence operations
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persist a new pending transaction with its ordered token set
    async fn insert(&self, transaction: Transaction) -> Result<Transaction, DomainError>;

    /// Find a transaction by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, DomainError>;

    /// Transactions involving the user as sender or recipient, newest first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Transaction>, DomainError>;

    /// All transactions still pending; input to startup reconciliation
    async fn list_pending(&self) -> Result<Vec<Transaction>, DomainError>;

    /// Transition pending → completed
    ///
    /// On success, atomically enqueues one reputation outbox event for each
    /// party in the same storage transaction, so the reputation hook fires
    /// exactly once per completed transaction.
    ///
    /// # Returns
    /// * `Ok(true)` - This call won the transition
    /// * `Ok(false)` - The transaction already left the pending state
    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Transition pending → failed, recording the ledger error code
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<bool, DomainError>;

    /// Transition pending → cancelled
    async fn mark_cancelled(&self, id: Uuid) -> Result<bool, DomainError>;
}
