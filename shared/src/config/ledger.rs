//! Ledger and exchange engine configuration module

use serde::{Deserialize, Serialize};

/// Configuration for the token ledger and exchange engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Bounded timeout for storage calls made by the exchange engine, in seconds
    #[serde(default = "default_storage_timeout")]
    pub storage_timeout_seconds: u64,

    /// Token selection policy: "fewest_tokens" or "smallest_overshoot"
    #[serde(default = "default_selection_policy")]
    pub selection_policy: String,

    /// Interval between expiry sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Whether the background expiry sweeper is enabled
    #[serde(default = "default_sweeper_enabled")]
    pub sweeper_enabled: bool,

    /// Interval between reputation outbox dispatch attempts, in seconds
    #[serde(default = "default_dispatch_interval")]
    pub reputation_dispatch_interval_seconds: u64,

    /// Profile-service URL for reputation notifications.
    /// When unset, notifications are logged instead of delivered.
    #[serde(default)]
    pub reputation_webhook_url: Option<String>,

    /// Redis URL for the catalog cache. When unset, caching is disabled.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TTL for the cached service catalog snapshot, in seconds
    #[serde(default = "default_catalog_cache_ttl")]
    pub catalog_cache_ttl_seconds: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_timeout_seconds: default_storage_timeout(),
            selection_policy: default_selection_policy(),
            sweep_interval_seconds: default_sweep_interval(),
            sweeper_enabled: default_sweeper_enabled(),
            reputation_dispatch_interval_seconds: default_dispatch_interval(),
            reputation_webhook_url: None,
            redis_url: None,
            catalog_cache_ttl_seconds: default_catalog_cache_ttl(),
        }
    }
}

impl LedgerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let storage_timeout_seconds = std::env::var("LEDGER_STORAGE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_storage_timeout);
        let selection_policy = std::env::var("LEDGER_SELECTION_POLICY")
            .unwrap_or_else(|_| default_selection_policy());
        let sweep_interval_seconds = std::env::var("LEDGER_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_sweep_interval);
        let sweeper_enabled = std::env::var("LEDGER_SWEEPER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or_else(|_| default_sweeper_enabled());
        let reputation_dispatch_interval_seconds =
            std::env::var("REPUTATION_DISPATCH_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_dispatch_interval);
        let reputation_webhook_url = std::env::var("REPUTATION_WEBHOOK_URL").ok();
        let redis_url = std::env::var("REDIS_URL").ok();
        let catalog_cache_ttl_seconds = std::env::var("CATALOG_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_catalog_cache_ttl);

        Self {
            storage_timeout_seconds,
            selection_policy,
            sweep_interval_seconds,
            sweeper_enabled,
            reputation_dispatch_interval_seconds,
            reputation_webhook_url,
            redis_url,
            catalog_cache_ttl_seconds,
        }
    }
}

fn default_storage_timeout() -> u64 {
    5
}

fn default_selection_policy() -> String {
    String::from("fewest_tokens")
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_sweeper_enabled() -> bool {
    true
}

fn default_dispatch_interval() -> u64 {
    60
}

fn default_catalog_cache_ttl() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_config_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.storage_timeout_seconds, 5);
        assert_eq!(config.selection_policy, "fewest_tokens");
        assert_eq!(config.sweep_interval_seconds, 3600);
        assert!(config.sweeper_enabled);
        assert!(config.reputation_webhook_url.is_none());
        assert!(config.redis_url.is_none());
    }
}
