//! Reputation delivery module
//!
//! Notifier implementations behind the core `ReputationNotifier` trait:
//! a webhook client for the profile service and a logging fallback used
//! when no webhook URL is configured.

pub mod logging;
pub mod webhook;

pub use logging::LoggingReputationNotifier;
pub use webhook::WebhookReputationNotifier;
