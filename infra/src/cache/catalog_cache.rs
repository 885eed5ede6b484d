//! Redis-backed catalog cache.
//!
//! Caches the full service catalog snapshot as one JSON value under
//! `marketplace:catalog` with a TTL. The `CatalogCache` contract is
//! fail-open: every error is stringly typed and the marketplace service
//! falls back to the repository, so a Redis outage only costs latency.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::{debug, info};

use mo_core::domain::entities::service::Service;
use mo_core::services::marketplace::CatalogCache;

use crate::InfrastructureError;

/// Cache key holding the serialized catalog snapshot
const CATALOG_KEY: &str = "marketplace:catalog";

/// Redis implementation of the marketplace catalog cache
#[derive(Clone)]
pub struct RedisCatalogCache {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Snapshot time-to-live in seconds
    ttl_seconds: u64,
}

impl RedisCatalogCache {
    /// Connect to Redis and create a catalog cache
    ///
    /// # Arguments
    /// * `url` - Redis connection URL
    /// * `ttl_seconds` - Snapshot time-to-live in seconds
    pub async fn new(url: &str, ttl_seconds: u64) -> Result<Self, InfrastructureError> {
        let client = Client::open(url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid Redis URL: {}", e)))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(InfrastructureError::Cache)?;

        info!("Catalog cache connected to Redis (ttl: {}s)", ttl_seconds);
        Ok(Self {
            connection,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl CatalogCache for RedisCatalogCache {
    async fn get(&self) -> Result<Option<Vec<Service>>, String> {
        let mut connection = self.connection.clone();
        let cached: Option<String> = connection
            .get(CATALOG_KEY)
            .await
            .map_err(|e| format!("catalog cache read failed: {}", e))?;

        match cached {
            Some(json) => {
                let catalog: Vec<Service> = serde_json::from_str(&json)
                    .map_err(|e| format!("catalog cache snapshot is corrupt: {}", e))?;
                debug!("Catalog cache hit ({} services)", catalog.len());
                Ok(Some(catalog))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, catalog: &[Service]) -> Result<(), String> {
        let json = serde_json::to_string(catalog)
            .map_err(|e| format!("catalog snapshot serialization failed: {}", e))?;

        let mut connection = self.connection.clone();
        let _: () = connection
            .set_ex(CATALOG_KEY, json, self.ttl_seconds)
            .await
            .map_err(|e| format!("catalog cache write failed: {}", e))?;

        debug!("Catalog cache refreshed ({} services)", catalog.len());
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), String> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .del(CATALOG_KEY)
            .await
            .map_err(|e| format!("catalog cache invalidation failed: {}", e))?;

        debug!("Catalog cache invalidated");
        Ok(())
    }
}
