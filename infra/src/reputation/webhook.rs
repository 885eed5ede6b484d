//! Webhook delivery of reputation events to the profile service.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use mo_core::services::reputation::ReputationNotifier;

use crate::InfrastructureError;

/// Request timeout for webhook deliveries
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload posted to the profile service for each completed transaction
#[derive(Debug, Serialize)]
struct ReputationPayload {
    user_id: Uuid,
    transaction_id: Uuid,
}

/// Notifier that POSTs reputation events to a configured webhook URL
///
/// Delivery errors are returned as strings: the dispatcher logs them and
/// leaves the event queued for the next cycle, so a flaky profile service
/// only delays delivery.
pub struct WebhookReputationNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookReputationNotifier {
    /// Create a notifier posting to the given URL
    pub fn new(url: impl Into<String>) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(InfrastructureError::Http)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ReputationNotifier for WebhookReputationNotifier {
    async fn notify_reputation(&self, user_id: Uuid, transaction_id: Uuid) -> Result<(), String> {
        let payload = ReputationPayload {
            user_id,
            transaction_id,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("reputation webhook request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "reputation webhook returned {}",
                response.status()
            ));
        }

        debug!(
            user_id = %user_id,
            transaction_id = %transaction_id,
            "Reputation event delivered"
        );
        Ok(())
    }
}
