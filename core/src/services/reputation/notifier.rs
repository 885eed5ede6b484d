//! Reputation notifier trait: the outbound hook to the profile service.

use async_trait::async_trait;
use uuid::Uuid;

/// Outbound reputation notification hook
///
/// Implementations deliver the event to the external profile service.
/// Errors are plain strings; the dispatcher only needs to know whether to
/// keep the event queued for redelivery.
#[async_trait]
pub trait ReputationNotifier: Send + Sync {
    /// Notify the profile service that a user took part in a completed
    /// transaction
    async fn notify_reputation(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), String>;
}
