//! Reputation outbox repository trait.
//!
//! Events are enqueued by `TransactionRepository::mark_completed`; this
//! trait only covers draining the queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::reputation::ReputationEvent;
use crate::errors::DomainError;

/// Repository trait for the reputation event outbox
#[async_trait]
pub trait ReputationEventRepository: Send + Sync {
    /// Undispatched events, oldest first, up to `limit`
    async fn pending_events(&self, limit: usize) -> Result<Vec<ReputationEvent>, DomainError>;

    /// Record successful delivery of an event
    ///
    /// Compare-and-swap on `dispatched_at IS NULL`; returns false when
    /// another dispatcher already delivered it.
    async fn mark_dispatched(
        &self,
        event_id: Uuid,
        dispatched_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
