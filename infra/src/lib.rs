//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Momentous backend.
//! It provides the concrete implementations behind the core repository
//! traits: the MySQL Token Store, transaction and catalog persistence, the
//! Redis catalog cache, and outbound reputation delivery.
//!
//! ## Architecture
//!
//! - **Database**: MySQL implementations using SQLx
//! - **Cache**: Redis read-through cache for the service catalog
//! - **Reputation**: webhook and logging notifier implementations

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis catalog cache
pub mod cache;

/// Reputation module - outbound notifier implementations
pub mod reputation;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
