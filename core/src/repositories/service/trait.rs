//! Service catalog repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::service::Service;
use crate::errors::DomainError;

/// Repository trait for Service catalog persistence operations
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Persist a new listing
    async fn insert(&self, service: Service) -> Result<Service, DomainError>;

    /// Find a listing by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, DomainError>;

    /// The full catalog in stable order (`created_at` ascending, then id)
    ///
    /// Filtering and sorting are pure functions over this snapshot, so the
    /// query engine may serve a stale cached copy.
    async fn list_all(&self) -> Result<Vec<Service>, DomainError>;
}
