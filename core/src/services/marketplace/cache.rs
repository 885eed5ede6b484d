//! Catalog cache trait.
//!
//! The query engine is pure and explicitly safe to run against a stale
//! snapshot, so the catalog is a natural cache candidate. The cache is
//! fail-open everywhere: errors are logged by the caller and never
//! surfaced to clients.

use async_trait::async_trait;

use crate::domain::entities::service::Service;

/// Read-through cache for the service catalog snapshot
#[async_trait]
pub trait CatalogCache: Send + Sync {
    /// The cached snapshot, if one is present and fresh
    async fn get(&self) -> Result<Option<Vec<Service>>, String>;

    /// Replace the cached snapshot
    async fn put(&self, catalog: &[Service]) -> Result<(), String>;

    /// Drop the cached snapshot (after a catalog mutation)
    async fn invalidate(&self) -> Result<(), String>;
}

/// Cache that never holds anything; used when no Redis URL is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCatalogCache;

#[async_trait]
impl CatalogCache for NoopCatalogCache {
    async fn get(&self) -> Result<Option<Vec<Service>>, String> {
        Ok(None)
    }

    async fn put(&self, _catalog: &[Service]) -> Result<(), String> {
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), String> {
        Ok(())
    }
}
