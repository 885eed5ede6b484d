//! Mock implementation of ServiceRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::service::Service;
use crate::errors::{DomainError, LedgerError};

use super::ServiceRepository;

/// In-memory mock of the service catalog
#[derive(Clone, Default)]
pub struct MockServiceRepository {
    services: Arc<RwLock<HashMap<Uuid, Service>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockServiceRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether operations should fail with a storage error
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    async fn fail_if_requested(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::Ledger(LedgerError::StorageUnavailable {
                message: "mock storage failure".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceRepository for MockServiceRepository {
    async fn insert(&self, service: Service) -> Result<Service, DomainError> {
        self.fail_if_requested().await?;

        let mut services = self.services.write().await;
        services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, DomainError> {
        self.fail_if_requested().await?;

        Ok(self.services.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Service>, DomainError> {
        self.fail_if_requested().await?;

        let services = self.services.read().await;
        let mut result: Vec<Service> = services.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }
}
