//! MySQL implementation of the ServiceRepository trait.
//!
//! Categories are stored as a JSON array in a TEXT column; membership
//! filtering happens in the marketplace query engine, not in SQL, so the
//! column never needs indexing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mo_core::domain::entities::service::Service;
use mo_core::errors::DomainError;
use mo_core::repositories::ServiceRepository;

use super::{map_sqlx_error, parse_uuid};

/// MySQL implementation of ServiceRepository
pub struct MySqlServiceRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlServiceRepository {
    /// Create a new MySQL service repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a Service entity
    fn row_to_service(row: &MySqlRow) -> Result<Service, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let provider_id: String =
            row.try_get("provider_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get provider_id: {}", e),
            })?;
        let categories_json: String =
            row.try_get("categories").map_err(|e| DomainError::Internal {
                message: format!("Failed to get categories: {}", e),
            })?;

        Ok(Service {
            id: parse_uuid("services.id", &id)?,
            provider_id: parse_uuid("services.provider_id", &provider_id)?,
            title: row.try_get("title").map_err(|e| DomainError::Internal {
                message: format!("Failed to get title: {}", e),
            })?,
            description: row
                .try_get("description")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get description: {}", e),
                })?,
            time_cost: row.try_get("time_cost").map_err(|e| DomainError::Internal {
                message: format!("Failed to get time_cost: {}", e),
            })?,
            categories: serde_json::from_str(&categories_json).map_err(|e| {
                DomainError::Internal {
                    message: format!("Invalid categories JSON: {}", e),
                }
            })?,
            avg_rating: row.try_get("avg_rating").map_err(|e| DomainError::Internal {
                message: format!("Failed to get avg_rating: {}", e),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get updated_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl ServiceRepository for MySqlServiceRepository {
    async fn insert(&self, service: Service) -> Result<Service, DomainError> {
        let categories_json =
            serde_json::to_string(&service.categories).map_err(|e| DomainError::Internal {
                message: format!("Failed to serialize categories: {}", e),
            })?;

        let query = r#"
            INSERT INTO services (
                id, provider_id, title, description, time_cost,
                categories, avg_rating, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(service.id.to_string())
            .bind(service.provider_id.to_string())
            .bind(&service.title)
            .bind(&service.description)
            .bind(service.time_cost)
            .bind(&categories_json)
            .bind(service.avg_rating)
            .bind(service.created_at)
            .bind(service.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert service", e))?;

        Ok(service)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, DomainError> {
        let query = r#"
            SELECT id, provider_id, title, description, time_cost,
                   categories, avg_rating, created_at, updated_at
            FROM services
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find service by id", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_service(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Service>, DomainError> {
        let query = r#"
            SELECT id, provider_id, title, description, time_cost,
                   categories, avg_rating, created_at, updated_at
            FROM services
            ORDER BY created_at ASC, id ASC
        "#;

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list services", e))?;

        let mut services = Vec::with_capacity(rows.len());
        for row in &rows {
            services.push(Self::row_to_service(row)?);
        }
        Ok(services)
    }
}
