//! Configuration modules for the Momentous backend.
//!
//! Every configuration struct can be built from environment variables via
//! `from_env()`; `AppConfig` aggregates them for server startup.

pub mod auth;
pub mod database;
pub mod environment;
pub mod ledger;
pub mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use ledger::LedgerConfig;
pub use server::ServerConfig;

/// Aggregate application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Runtime environment (development/staging/production)
    pub environment: Environment,

    /// HTTP server settings
    pub server: ServerConfig,

    /// MySQL connection settings
    pub database: DatabaseConfig,

    /// Ledger and exchange engine settings
    pub ledger: LedgerConfig,

    /// Bearer-token identity settings
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            ledger: LedgerConfig::from_env(),
            auth: AuthConfig::from_env(),
        }
    }
}
