//! MySQL implementation of the TokenRepository trait.
//!
//! The Token Store is the only shared mutable resource in the system, so
//! this implementation leans on the database for its atomicity guarantees:
//! `transfer_many` runs inside a single SQL transaction with `SELECT ...
//! FOR UPDATE` row locks plus a version compare-and-swap, so two transfers
//! over overlapping token sets resolve to exactly one winner and no partial
//! transfer is ever visible.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mo_core::domain::entities::token::TimeToken;
use mo_core::errors::{DomainError, LedgerError};
use mo_core::repositories::TokenRepository;

use super::{map_sqlx_error, parse_uuid};

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a TimeToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<TimeToken, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let issuer_id: String = row.try_get("issuer_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get issuer_id: {}", e),
        })?;
        let current_owner_id: String =
            row.try_get("current_owner_id")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get current_owner_id: {}", e),
                })?;

        Ok(TimeToken {
            id: parse_uuid("time_tokens.id", &id)?,
            issuer_id: parse_uuid("time_tokens.issuer_id", &issuer_id)?,
            current_owner_id: parse_uuid("time_tokens.current_owner_id", &current_owner_id)?,
            denomination: row
                .try_get("denomination")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get denomination: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            is_active: row.try_get("is_active").map_err(|e| DomainError::Internal {
                message: format!("Failed to get is_active: {}", e),
            })?,
            version: row.try_get("version").map_err(|e| DomainError::Internal {
                message: format!("Failed to get version: {}", e),
            })?,
        })
    }

    /// Build an `IN (?, ?, ...)` placeholder list for the given id count
    fn placeholders(count: usize) -> String {
        vec!["?"; count].join(", ")
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn insert(&self, token: TimeToken) -> Result<TimeToken, DomainError> {
        let query = r#"
            INSERT INTO time_tokens (
                id, issuer_id, current_owner_id, denomination,
                created_at, expires_at, is_active, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.issuer_id.to_string())
            .bind(token.current_owner_id.to_string())
            .bind(token.denomination)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.is_active)
            .bind(token.version)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert token", e))?;

        Ok(token)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeToken>, DomainError> {
        let query = r#"
            SELECT id, issuer_id, current_owner_id, denomination,
                   created_at, expires_at, is_active, version
            FROM time_tokens
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find token by id", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TimeToken>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r#"
            SELECT id, issuer_id, current_owner_id, denomination,
                   created_at, expires_at, is_active, version
            FROM time_tokens
            WHERE id IN ({})
            "#,
            Self::placeholders(ids.len())
        );

        let mut stmt = sqlx::query(&query);
        for id in ids {
            stmt = stmt.bind(id.to_string());
        }
        let rows = stmt
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to find tokens by ids", e))?;

        let mut by_id = std::collections::HashMap::with_capacity(rows.len());
        for row in &rows {
            let token = Self::row_to_token(row)?;
            by_id.insert(token.id, token);
        }

        // Unknown ids are simply absent; callers compare lengths
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_active_by_owner(
        &self,
        owner_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<TimeToken>, DomainError> {
        let query = r#"
            SELECT id, issuer_id, current_owner_id, denomination,
                   created_at, expires_at, is_active, version
            FROM time_tokens
            WHERE current_owner_id = ?
                AND is_active = TRUE
                AND (expires_at IS NULL OR expires_at > ?)
            ORDER BY denomination ASC, created_at ASC
        "#;

        let rows = sqlx::query(query)
            .bind(owner_id.to_string())
            .bind(as_of)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list holdings", e))?;

        let mut tokens = Vec::with_capacity(rows.len());
        for row in &rows {
            tokens.push(Self::row_to_token(row)?);
        }
        Ok(tokens)
    }

    async fn transfer_many(
        &self,
        token_ids: &[Uuid],
        from_owner_id: Uuid,
        to_owner_id: Uuid,
    ) -> Result<Vec<TimeToken>, DomainError> {
        let mut seen = std::collections::HashSet::new();
        for id in token_ids {
            if !seen.insert(*id) {
                return Err(LedgerError::DuplicateToken { token_id: *id }.into());
            }
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transfer", e))?;

        // Lock every row up front; a dropped transaction rolls back
        let select = format!(
            r#"
            SELECT id, issuer_id, current_owner_id, denomination,
                   created_at, expires_at, is_active, version
            FROM time_tokens
            WHERE id IN ({})
            FOR UPDATE
            "#,
            Self::placeholders(token_ids.len())
        );
        let mut stmt = sqlx::query(&select);
        for id in token_ids {
            stmt = stmt.bind(id.to_string());
        }
        let rows = stmt
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to lock tokens for transfer", e))?;

        let mut locked = std::collections::HashMap::with_capacity(rows.len());
        for row in &rows {
            let token = Self::row_to_token(row)?;
            locked.insert(token.id, token);
        }

        // Validate the full set before mutating anything
        let now = Utc::now();
        let mut tokens = Vec::with_capacity(token_ids.len());
        for id in token_ids {
            let token = locked
                .remove(id)
                .ok_or(LedgerError::OwnershipMismatch { token_id: *id })?;
            if token.current_owner_id != from_owner_id {
                return Err(LedgerError::OwnershipMismatch { token_id: *id }.into());
            }
            if !token.is_spendable(now) {
                return Err(LedgerError::TokenInactive { token_id: *id }.into());
            }
            tokens.push(token);
        }

        let update = r#"
            UPDATE time_tokens
            SET current_owner_id = ?, version = version + 1
            WHERE id = ? AND version = ?
        "#;
        for token in &mut tokens {
            let result = sqlx::query(update)
                .bind(to_owner_id.to_string())
                .bind(token.id.to_string())
                .bind(token.version)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Failed to reassign token", e))?;

            // The row is locked, so a lost CAS means someone moved it
            // between our read and this write in an earlier transaction
            if result.rows_affected() == 0 {
                return Err(LedgerError::OwnershipMismatch { token_id: token.id }.into());
            }
            token.current_owner_id = to_owner_id;
            token.version += 1;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transfer", e))?;

        Ok(tokens)
    }

    async fn deactivate_expired(&self, as_of: DateTime<Utc>) -> Result<u64, DomainError> {
        let query = r#"
            UPDATE time_tokens
            SET is_active = FALSE, version = version + 1
            WHERE is_active = TRUE
                AND expires_at IS NOT NULL
                AND expires_at <= ?
        "#;

        let result = sqlx::query(query)
            .bind(as_of)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to deactivate expired tokens", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_list() {
        assert_eq!(MySqlTokenRepository::placeholders(1), "?");
        assert_eq!(MySqlTokenRepository::placeholders(3), "?, ?, ?");
    }
}
