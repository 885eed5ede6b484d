//! MySQL implementation of the TransactionRepository trait.
//!
//! Transactions span three tables: `transactions` for the record itself,
//! `transaction_tokens` for the ordered token set, and `reputation_events`
//! for the outbox. Every status transition is an `UPDATE ... WHERE status =
//! 'pending'` compare-and-swap; `mark_completed` inserts the two outbox
//! events in the same SQL transaction as the status flip, so the reputation
//! hook fires exactly once per completed transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mo_core::domain::entities::transaction::{Transaction, TransactionStatus};
use mo_core::errors::DomainError;
use mo_core::repositories::TransactionRepository;

use super::{map_sqlx_error, parse_uuid};

/// MySQL implementation of TransactionRepository
pub struct MySqlTransactionRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTransactionRepository {
    /// Create a new MySQL transaction repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a Transaction entity (without token ids)
    fn row_to_transaction(row: &MySqlRow) -> Result<Transaction, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let sender_id: String = row.try_get("sender_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get sender_id: {}", e),
        })?;
        let recipient_id: String =
            row.try_get("recipient_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get recipient_id: {}", e),
                })?;
        let service_id: Option<String> =
            row.try_get("service_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get service_id: {}", e),
            })?;
        let status: String = row.try_get("status").map_err(|e| DomainError::Internal {
            message: format!("Failed to get status: {}", e),
        })?;

        Ok(Transaction {
            id: parse_uuid("transactions.id", &id)?,
            sender_id: parse_uuid("transactions.sender_id", &sender_id)?,
            recipient_id: parse_uuid("transactions.recipient_id", &recipient_id)?,
            service_id: match service_id {
                Some(s) => Some(parse_uuid("transactions.service_id", &s)?),
                None => None,
            },
            token_ids: Vec::new(),
            status: status
                .parse::<TransactionStatus>()
                .map_err(|e| DomainError::Internal { message: e })?,
            failure_reason: row
                .try_get("failure_reason")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get failure_reason: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            completed_at: row
                .try_get::<Option<DateTime<Utc>>, _>("completed_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get completed_at: {}", e),
                })?,
        })
    }

    /// Load the ordered token set for a transaction
    async fn load_token_ids(&self, transaction_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let query = r#"
            SELECT token_id
            FROM transaction_tokens
            WHERE transaction_id = ?
            ORDER BY position ASC
        "#;

        let rows = sqlx::query(query)
            .bind(transaction_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to load transaction tokens", e))?;

        let mut token_ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let token_id: String = row.try_get("token_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get token_id: {}", e),
            })?;
            token_ids.push(parse_uuid("transaction_tokens.token_id", &token_id)?);
        }
        Ok(token_ids)
    }

    /// Hydrate token sets for a list of transactions
    async fn with_token_ids(
        &self,
        mut transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, DomainError> {
        for transaction in &mut transactions {
            transaction.token_ids = self.load_token_ids(transaction.id).await?;
        }
        Ok(transactions)
    }
}

#[async_trait]
impl TransactionRepository for MySqlTransactionRepository {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction insert", e))?;

        let query = r#"
            INSERT INTO transactions (
                id, sender_id, recipient_id, service_id, status,
                failure_reason, created_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;
        sqlx::query(query)
            .bind(transaction.id.to_string())
            .bind(transaction.sender_id.to_string())
            .bind(transaction.recipient_id.to_string())
            .bind(transaction.service_id.map(|id| id.to_string()))
            .bind(transaction.status.as_str())
            .bind(&transaction.failure_reason)
            .bind(transaction.created_at)
            .bind(transaction.completed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert transaction", e))?;

        let token_query = r#"
            INSERT INTO transaction_tokens (transaction_id, token_id, position)
            VALUES (?, ?, ?)
        "#;
        for (position, token_id) in transaction.token_ids.iter().enumerate() {
            sqlx::query(token_query)
                .bind(transaction.id.to_string())
                .bind(token_id.to_string())
                .bind(position as i32)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Failed to insert transaction token", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction insert", e))?;

        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, DomainError> {
        let query = r#"
            SELECT id, sender_id, recipient_id, service_id, status,
                   failure_reason, created_at, completed_at
            FROM transactions
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find transaction by id", e))?;

        match result {
            Some(row) => {
                let mut transaction = Self::row_to_transaction(&row)?;
                transaction.token_ids = self.load_token_ids(transaction.id).await?;
                Ok(Some(transaction))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Transaction>, DomainError> {
        let query = r#"
            SELECT id, sender_id, recipient_id, service_id, status,
                   failure_reason, created_at, completed_at
            FROM transactions
            WHERE sender_id = ? OR recipient_id = ?
            ORDER BY created_at DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(user_id.to_string())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list user transactions", e))?;

        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            transactions.push(Self::row_to_transaction(row)?);
        }
        self.with_token_ids(transactions).await
    }

    async fn list_pending(&self) -> Result<Vec<Transaction>, DomainError> {
        let query = r#"
            SELECT id, sender_id, recipient_id, service_id, status,
                   failure_reason, created_at, completed_at
            FROM transactions
            WHERE status = 'pending'
            ORDER BY created_at ASC
        "#;

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list pending transactions", e))?;

        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            transactions.push(Self::row_to_transaction(row)?);
        }
        self.with_token_ids(transactions).await
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin completion", e))?;

        let update = r#"
            UPDATE transactions
            SET status = 'completed', completed_at = ?
            WHERE id = ? AND status = 'pending'
        "#;
        let result = sqlx::query(update)
            .bind(completed_at)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to complete transaction", e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let parties = sqlx::query("SELECT sender_id, recipient_id FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to read transaction parties", e))?;
        let sender_id: String = parties
            .try_get("sender_id")
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to get sender_id: {}", e),
            })?;
        let recipient_id: String =
            parties
                .try_get("recipient_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get recipient_id: {}", e),
                })?;

        // Outbox inserts share the status flip's SQL transaction
        let event_query = r#"
            INSERT INTO reputation_events (id, transaction_id, user_id, created_at, dispatched_at)
            VALUES (?, ?, ?, ?, NULL)
        "#;
        for user_id in [sender_id, recipient_id] {
            sqlx::query(event_query)
                .bind(Uuid::new_v4().to_string())
                .bind(id.to_string())
                .bind(user_id)
                .bind(completed_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Failed to enqueue reputation event", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit completion", e))?;

        Ok(true)
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE transactions
            SET status = 'failed', failure_reason = ?
            WHERE id = ? AND status = 'pending'
        "#;

        let result = sqlx::query(query)
            .bind(reason)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to fail transaction", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_cancelled(&self, id: Uuid) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE transactions
            SET status = 'cancelled'
            WHERE id = ? AND status = 'pending'
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to cancel transaction", e))?;

        Ok(result.rows_affected() > 0)
    }
}
