//! Logging fallback for reputation notifications.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use mo_core::services::reputation::ReputationNotifier;

/// Notifier that records reputation events in the logs
///
/// Used when no `REPUTATION_WEBHOOK_URL` is configured, typically in
/// development. Never fails, so events are always drained.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReputationNotifier;

#[async_trait]
impl ReputationNotifier for LoggingReputationNotifier {
    async fn notify_reputation(&self, user_id: Uuid, transaction_id: Uuid) -> Result<(), String> {
        info!(
            user_id = %user_id,
            transaction_id = %transaction_id,
            "Reputation event (logging notifier)"
        );
        Ok(())
    }
}
