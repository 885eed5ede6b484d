//! Mock implementation of ReputationEventRepository for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::reputation::ReputationEvent;
use crate::errors::{DomainError, LedgerError};

use super::ReputationEventRepository;

/// In-memory mock of the reputation outbox
///
/// Clones share the same underlying queue, so a transaction mock and a
/// dispatcher can observe the same events.
#[derive(Clone, Default)]
pub struct MockReputationEventRepository {
    events: Arc<RwLock<Vec<ReputationEvent>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockReputationEventRepository {
    /// Create a new empty mock outbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether operations should fail with a storage error
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Enqueue an event (used by the transaction mock on completion)
    pub async fn enqueue(&self, event: ReputationEvent) {
        self.events.write().await.push(event);
    }

    /// All stored events, dispatched or not, for assertions
    pub async fn all_events(&self) -> Vec<ReputationEvent> {
        self.events.read().await.clone()
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
impl ReputationEventRepository for MockReputationEventRepository {
    async fn pending_events(&self, limit: usize) -> Result<Vec<ReputationEvent>, DomainError> {
        self.fail_if_requested().await?;

        let events = self.events.read().await;
        let mut pending: Vec<ReputationEvent> = events
            .iter()
            .filter(|e| !e.is_dispatched())
            .cloned()
            .collect();

        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_dispatched(
        &self,
        event_id: Uuid,
        dispatched_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.fail_if_requested().await?;

        let mut events = self.events.write().await;
        for event in events.iter_mut() {
            if event.id == event_id && !event.is_dispatched() {
                event.dispatched_at = Some(dispatched_at);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
