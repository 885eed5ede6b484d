//! Mock implementation of TransactionRepository for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::reputation::ReputationEvent;
use crate::domain::entities::transaction::{Transaction, TransactionStatus};
use crate::errors::{DomainError, LedgerError};
use crate::repositories::reputation::MockReputationEventRepository;

use super::TransactionRepository;

/// In-memory mock of the transaction store
///
/// When built with `with_outbox`, a won `mark_completed` enqueues the two
/// reputation events into the shared outbox mock under the same write lock,
/// mirroring the MySQL implementation's single-transaction insert.
#[derive(Clone, Default)]
pub struct MockTransactionRepository {
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
    outbox: Option<MockReputationEventRepository>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockTransactionRepository {
    /// Create a new empty mock repository without an outbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a shared reputation outbox mock
    pub fn with_outbox(outbox: MockReputationEventRepository) -> Self {
        Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
            outbox: Some(outbox),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Set whether operations should fail with a storage error
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Fetch a stored transaction for assertions
    pub async fn get(&self, id: Uuid) -> Option<Transaction> {
        self.transactions.read().await.get(&id).cloned()
    }

    async fn fail_if_requested(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::Ledger(LedgerError::StorageUnavailable {
                message: "mock storage failure".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for MockTransactionRepository {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction, DomainError> {
        self.fail_if_requested().await?;

        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, DomainError> {
        self.fail_if_requested().await?;

        Ok(self.transactions.read().await.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Transaction>, DomainError> {
        self.fail_if_requested().await?;

        let transactions = self.transactions.read().await;
        let mut result: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.involves(user_id))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }

    async fn list_pending(&self) -> Result<Vec<Transaction>, DomainError> {
        self.fail_if_requested().await?;

        let transactions = self.transactions.read().await;
        let mut result: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.status == TransactionStatus::Pending)
            .cloned()
            .collect();

        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.fail_if_requested().await?;

        let mut transactions = self.transactions.write().await;
        let Some(txn) = transactions.get_mut(&id) else {
            return Ok(false);
        };
        if !txn.complete(completed_at) {
            return Ok(false);
        }

        if let Some(outbox) = &self.outbox {
            outbox
                .enqueue(ReputationEvent::new(txn.id, txn.sender_id))
                .await;
            outbox
                .enqueue(ReputationEvent::new(txn.id, txn.recipient_id))
                .await;
        }
        Ok(true)
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<bool, DomainError> {
        self.fail_if_requested().await?;

        let mut transactions = self.transactions.write().await;
        Ok(transactions
            .get_mut(&id)
            .map(|txn| txn.fail(reason))
            .unwrap_or(false))
    }

    async fn mark_cancelled(&self, id: Uuid) -> Result<bool, DomainError> {
        self.fail_if_requested().await?;

        let mut transactions = self.transactions.write().await;
        Ok(transactions
            .get_mut(&id)
            .map(|txn| txn.cancel())
            .unwrap_or(false))
    }
}
