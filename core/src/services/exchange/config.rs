//! Exchange engine configuration.

use std::time::Duration;

use super::selection::SelectionPolicy;

/// Configuration for the transaction engine
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Bounded timeout for storage calls; an elapsed transfer is treated
    /// as failed, never as unknown
    pub storage_timeout: Duration,

    /// Policy used when the engine selects tokens on the caller's behalf
    pub selection_policy: SelectionPolicy,

    /// Default page size for recent-transaction listings
    pub recent_default_limit: usize,

    /// Hard cap for recent-transaction listings
    pub recent_max_limit: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_secs(5),
            selection_policy: SelectionPolicy::default(),
            recent_default_limit: 20,
            recent_max_limit: 100,
        }
    }
}

impl ExchangeConfig {
    /// Override the storage timeout
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Override the selection policy
    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }
}
