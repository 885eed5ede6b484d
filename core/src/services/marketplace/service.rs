//! Marketplace service: catalog discovery and listing creation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::service::{Service, MIN_TIME_COST_MINUTES};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::ServiceRepository;

use super::cache::CatalogCache;
use super::filter::{apply_filter, ServiceFilter};

/// Provider input for a new listing
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub time_cost: i32,
    pub categories: Vec<String>,
}

/// Service for catalog queries and provider listings
pub struct MarketplaceService<S, C>
where
    S: ServiceRepository,
    C: CatalogCache,
{
    services: Arc<S>,
    cache: Arc<C>,
}

impl<S, C> MarketplaceService<S, C>
where
    S: ServiceRepository,
    C: CatalogCache,
{
    /// Create a new marketplace service
    pub fn new(services: Arc<S>, cache: Arc<C>) -> Self {
        Self { services, cache }
    }

    /// Filter and sort the catalog
    ///
    /// Reads through the cache when possible; cache failures fall back to
    /// the repository and are never surfaced.
    pub async fn search(&self, filter: &ServiceFilter) -> DomainResult<Vec<Service>> {
        let catalog = self.catalog_snapshot().await?;
        Ok(apply_filter(&catalog, filter))
    }

    /// Look up a single listing
    pub async fn get(&self, service_id: Uuid) -> DomainResult<Service> {
        self.services
            .find_by_id(service_id)
            .await?
            .ok_or(DomainError::NotFound {
                resource: format!("service {}", service_id),
            })
    }

    /// Create a listing owned by the calling provider
    pub async fn create_listing(
        &self,
        provider_id: Uuid,
        listing: NewListing,
    ) -> DomainResult<Service> {
        let title = listing.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation {
                message: "title must not be empty".to_string(),
            });
        }
        if listing.time_cost < MIN_TIME_COST_MINUTES {
            return Err(DomainError::Validation {
                message: format!(
                    "time_cost must be at least {} minutes",
                    MIN_TIME_COST_MINUTES
                ),
            });
        }

        // Set semantics: trim, drop empties, collapse duplicates keeping
        // first occurrence
        let mut categories: Vec<String> = Vec::new();
        for category in &listing.categories {
            let category = category.trim();
            if !category.is_empty() && !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
        }
        if categories.is_empty() {
            return Err(DomainError::Validation {
                message: "at least one category is required".to_string(),
            });
        }

        let service = self
            .services
            .insert(Service::new(
                provider_id,
                title,
                listing.description.trim().to_string(),
                listing.time_cost,
                categories,
            ))
            .await?;

        if let Err(e) = self.cache.invalidate().await {
            warn!("Catalog cache invalidation failed: {}", e);
        }
        info!(service_id = %service.id, provider_id = %provider_id, "Listing created");
        Ok(service)
    }

    /// The catalog snapshot, through the fail-open cache
    async fn catalog_snapshot(&self) -> DomainResult<Vec<Service>> {
        match self.cache.get().await {
            Ok(Some(catalog)) => return Ok(catalog),
            Ok(None) => {}
            Err(e) => warn!("Catalog cache read failed, using repository: {}", e),
        }

        let catalog = self.services.list_all().await?;
        if let Err(e) = self.cache.put(&catalog).await {
            warn!("Catalog cache write failed: {}", e);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockServiceRepository;
    use crate::services::marketplace::cache::NoopCatalogCache;
    use crate::services::marketplace::filter::ServiceSort;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn marketplace() -> MarketplaceService<MockServiceRepository, NoopCatalogCache> {
        MarketplaceService::new(
            Arc::new(MockServiceRepository::new()),
            Arc::new(NoopCatalogCache),
        )
    }

    fn listing(title: &str, time_cost: i32, categories: &[&str]) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: format!("{} description", title),
            time_cost,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_listing_and_search() {
        let marketplace = marketplace();
        let provider = Uuid::new_v4();

        marketplace
            .create_listing(provider, listing("Dog walking", 30, &["pets"]))
            .await
            .unwrap();
        marketplace
            .create_listing(provider, listing("Laptop tune-up", 60, &["technology"]))
            .await
            .unwrap();

        let filter = ServiceFilter {
            category: Some("pets".to_string()),
            sort: ServiceSort::Oldest,
            ..Default::default()
        };
        let result = marketplace.search(&filter).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Dog walking");
        assert_eq!(result[0].provider_id, provider);
    }

    #[tokio::test]
    async fn test_create_listing_rejects_cheap_or_untagged() {
        let marketplace = marketplace();
        let provider = Uuid::new_v4();

        let too_cheap = marketplace
            .create_listing(provider, listing("Quick chat", 10, &["social"]))
            .await;
        assert!(matches!(too_cheap, Err(DomainError::Validation { .. })));

        let untagged = marketplace
            .create_listing(provider, listing("Mystery", 30, &["  ", ""]))
            .await;
        assert!(matches!(untagged, Err(DomainError::Validation { .. })));

        let untitled = marketplace
            .create_listing(provider, listing("   ", 30, &["misc"]))
            .await;
        assert!(matches!(untitled, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_categories_deduplicated_preserving_first() {
        let marketplace = marketplace();

        let service = marketplace
            .create_listing(
                Uuid::new_v4(),
                listing("Tutoring", 45, &["education", " education ", "kids"]),
            )
            .await
            .unwrap();

        assert_eq!(service.categories, vec!["education", "kids"]);
    }

    #[tokio::test]
    async fn test_get_unknown_listing() {
        let marketplace = marketplace();
        let err = marketplace.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    /// Cache that always errors, to prove fail-open behavior
    #[derive(Default)]
    struct BrokenCache {
        reads: Mutex<usize>,
    }

    #[async_trait]
    impl CatalogCache for BrokenCache {
        async fn get(&self) -> Result<Option<Vec<Service>>, String> {
            *self.reads.lock().unwrap() += 1;
            Err("redis down".to_string())
        }

        async fn put(&self, _catalog: &[Service]) -> Result<(), String> {
            Err("redis down".to_string())
        }

        async fn invalidate(&self) -> Result<(), String> {
            Err("redis down".to_string())
        }
    }

    #[tokio::test]
    async fn test_cache_failures_are_fail_open() {
        let repository = Arc::new(MockServiceRepository::new());
        let cache = Arc::new(BrokenCache::default());
        let marketplace = MarketplaceService::new(repository, cache.clone());

        let service = marketplace
            .create_listing(Uuid::new_v4(), listing("Ironing", 30, &["home"]))
            .await
            .unwrap();

        let result = marketplace.search(&ServiceFilter::default()).await.unwrap();

        assert_eq!(result, vec![service]);
        assert_eq!(*cache.reads.lock().unwrap(), 1);
    }
}
