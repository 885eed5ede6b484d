//! Reputation outbox event entity.
//!
//! Completion of a transaction must notify the external profile service
//! exactly once per party. Rather than calling the collaborator inline,
//! completion enqueues one event per party in the same storage transaction
//! as the status change; a dispatcher drains the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending or delivered reputation notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationEvent {
    /// Unique identifier for the event
    pub id: Uuid,

    /// Transaction whose completion triggered the event
    pub transaction_id: Uuid,

    /// Party to notify (sender or recipient)
    pub user_id: Uuid,

    /// Timestamp when the event was enqueued
    pub created_at: DateTime<Utc>,

    /// Timestamp of successful delivery; `None` while still queued
    pub dispatched_at: Option<DateTime<Utc>>,
}

impl ReputationEvent {
    /// Creates a new undispatched event
    pub fn new(transaction_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            user_id,
            created_at: Utc::now(),
            dispatched_at: None,
        }
    }

    /// Whether the event has been delivered
    pub fn is_dispatched(&self) -> bool {
        self.dispatched_at.is_some()
    }
}
