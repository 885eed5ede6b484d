//! MySQL implementation of the ReputationEventRepository trait.
//!
//! Events are inserted by `MySqlTransactionRepository::mark_completed`;
//! this repository only drains the outbox. `mark_dispatched` is guarded on
//! `dispatched_at IS NULL`, so concurrent dispatchers resolve to one winner
//! per event.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mo_core::domain::entities::reputation::ReputationEvent;
use mo_core::errors::DomainError;
use mo_core::repositories::ReputationEventRepository;

use super::{map_sqlx_error, parse_uuid};

/// MySQL implementation of ReputationEventRepository
pub struct MySqlReputationEventRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlReputationEventRepository {
    /// Create a new MySQL reputation event repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a ReputationEvent entity
    fn row_to_event(row: &sqlx::mysql::MySqlRow) -> Result<ReputationEvent, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let transaction_id: String =
            row.try_get("transaction_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get transaction_id: {}", e),
                })?;
        let user_id: String = row.try_get("user_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get user_id: {}", e),
        })?;

        Ok(ReputationEvent {
            id: parse_uuid("reputation_events.id", &id)?,
            transaction_id: parse_uuid("reputation_events.transaction_id", &transaction_id)?,
            user_id: parse_uuid("reputation_events.user_id", &user_id)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            dispatched_at: row
                .try_get::<Option<DateTime<Utc>>, _>("dispatched_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get dispatched_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl ReputationEventRepository for MySqlReputationEventRepository {
    async fn pending_events(&self, limit: usize) -> Result<Vec<ReputationEvent>, DomainError> {
        let query = r#"
            SELECT id, transaction_id, user_id, created_at, dispatched_at
            FROM reputation_events
            WHERE dispatched_at IS NULL
            ORDER BY created_at ASC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list pending reputation events", e))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(Self::row_to_event(row)?);
        }
        Ok(events)
    }

    async fn mark_dispatched(
        &self,
        event_id: Uuid,
        dispatched_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE reputation_events
            SET dispatched_at = ?
            WHERE id = ? AND dispatched_at IS NULL
        "#;

        let result = sqlx::query(query)
            .bind(dispatched_at)
            .bind(event_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to mark reputation event dispatched", e))?;

        Ok(result.rows_affected() > 0)
    }
}
