//! Expiry sweeper: recurring deactivation of expired tokens.
//!
//! A background task invoking the Token Store's `deactivate_expired` on a
//! fixed interval. Storage errors are non-fatal; the sweep is retried at
//! the next tick and never blocks foreground transaction processing.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether the background sweep is enabled
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

/// Result of one sweep cycle
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// Number of tokens newly deactivated
    pub deactivated: u64,
}

/// Service deactivating tokens past their expiry timestamp
pub struct ExpirySweeper<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: SweeperConfig,
}

impl<R: TokenRepository> ExpirySweeper<R> {
    /// Create a new expiry sweeper
    pub fn new(repository: Arc<R>, config: SweeperConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single sweep cycle
    ///
    /// Idempotent: a second immediate sweep deactivates 0 tokens.
    pub async fn run_sweep(&self) -> Result<SweepOutcome, DomainError> {
        let deactivated = self.repository.deactivate_expired(Utc::now()).await?;

        if deactivated > 0 {
            info!(deactivated, "Expiry sweep deactivated tokens");
        }
        Ok(SweepOutcome { deactivated })
    }

    /// Start the sweeper as a background task
    ///
    /// Spawns a tokio task that sweeps at regular intervals. Sweep failures
    /// are logged and retried at the next interval.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Expiry sweeper is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Expiry sweeper started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!("Expiry sweep failed, will retry next interval: {}", e);
                }
            }
        });
    }
}
