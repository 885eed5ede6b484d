//! Database connection pool management
//!
//! Connection pooling over SQLx with MySQL: pool configuration, health
//! checks, and shutdown. The pool is cheap to clone and shared by every
//! repository.

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::log::LevelFilter;

use mo_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx MySQL connection pool
    pool: MySqlPool,
}

impl DatabasePool {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `config` - Database configuration settings
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            "Creating database connection pool with max_connections: {}",
            config.max_connections
        );

        let mut connect_options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?;

        connect_options = connect_options
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_secs(1));

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create database pool: {}", e);
                InfrastructureError::Database(e)
            })?;

        tracing::info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying SQLx pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    ///
    /// Performs a simple query to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                InfrastructureError::Database(e)
            })?;

        let value: i32 = sqlx::Row::try_get(&result, 0).unwrap_or(0);
        Ok(value == 1)
    }

    /// Get connection pool statistics
    pub fn get_statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    /// Close all connections in the pool
    ///
    /// This should be called during application shutdown.
    pub async fn close(&self) {
        tracing::info!("Closing database connection pool");
        self.pool.close().await;
    }
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creation_with_invalid_url() {
        let config = DatabaseConfig::new("invalid://url");
        let result = DatabasePool::new(config).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_pool_statistics_display() {
        let stats = PoolStatistics {
            connections: 5,
            idle_connections: 3,
            max_connections: 10,
        };

        let display = format!("{}", stats);
        assert!(display.contains("5/10"));
        assert!(display.contains("3 idle"));
    }
}
