//! Token service: minting and holdings queries over the Token Store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::token::TimeToken;
use crate::errors::{DomainError, DomainResult, LedgerError};
use crate::repositories::TokenRepository;

/// Service for minting tokens and reading a user's holdings
pub struct TokenService<R: TokenRepository> {
    repository: Arc<R>,
}

impl<R: TokenRepository> TokenService<R> {
    /// Create a new token service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Mint a new token owned by its issuer
    ///
    /// # Arguments
    /// * `issuer_id` - The minting user; becomes the initial owner
    /// * `denomination` - Face value in minutes; positive multiple of 15
    /// * `expires_at` - Optional expiry, must lie in the future
    ///
    /// # Errors
    /// * `LedgerError::InvalidDenomination` - denomination is not a
    ///   positive multiple of 15
    /// * `DomainError::Validation` - expiry is not in the future
    pub async fn mint(
        &self,
        issuer_id: Uuid,
        denomination: i32,
        expires_at: Option<DateTime<Utc>>,
    ) -> DomainResult<TimeToken> {
        if !TimeToken::is_valid_denomination(denomination) {
            return Err(LedgerError::InvalidDenomination { denomination }.into());
        }
        if let Some(expires_at) = expires_at {
            if expires_at <= Utc::now() {
                return Err(DomainError::Validation {
                    message: "expires_at must be in the future".to_string(),
                });
            }
        }

        let token = self
            .repository
            .insert(TimeToken::new(issuer_id, denomination, expires_at))
            .await?;

        info!(
            token_id = %token.id,
            issuer_id = %issuer_id,
            denomination,
            "Minted time token"
        );
        Ok(token)
    }

    /// The caller's active, unexpired tokens in selection order
    pub async fn active_tokens(&self, owner_id: Uuid) -> DomainResult<Vec<TimeToken>> {
        self.repository
            .find_active_by_owner(owner_id, Utc::now())
            .await
    }

    /// Look up a single token
    pub async fn token(&self, id: Uuid) -> DomainResult<TimeToken> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                resource: format!("token {}", id),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockTokenRepository;
    use chrono::Duration;

    fn service() -> TokenService<MockTokenRepository> {
        TokenService::new(Arc::new(MockTokenRepository::new()))
    }

    #[tokio::test]
    async fn test_mint_valid_denomination() {
        let service = service();
        let issuer = Uuid::new_v4();

        let token = service.mint(issuer, 60, None).await.unwrap();

        assert_eq!(token.current_owner_id, issuer);
        assert_eq!(token.denomination, 60);
        assert!(token.is_active);
    }

    #[tokio::test]
    async fn test_mint_rejects_non_multiple_of_fifteen() {
        let service = service();

        let err = service.mint(Uuid::new_v4(), 40, None).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Ledger(LedgerError::InvalidDenomination { denomination: 40 })
        ));
    }

    #[tokio::test]
    async fn test_mint_rejects_below_minimum() {
        let service = service();

        for denomination in [0, -15, 14] {
            let err = service
                .mint(Uuid::new_v4(), denomination, None)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DomainError::Ledger(LedgerError::InvalidDenomination { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_mint_rejects_past_expiry() {
        let service = service();

        let err = service
            .mint(Uuid::new_v4(), 30, Some(Utc::now() - Duration::hours(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_active_tokens_sorted_for_selection() {
        let service = service();
        let owner = Uuid::new_v4();

        service.mint(owner, 60, None).await.unwrap();
        service.mint(owner, 15, None).await.unwrap();
        service.mint(owner, 30, None).await.unwrap();

        let holdings = service.active_tokens(owner).await.unwrap();
        let denominations: Vec<i32> = holdings.iter().map(|t| t.denomination).collect();

        assert_eq!(denominations, vec![15, 30, 60]);
    }

    #[tokio::test]
    async fn test_token_lookup_not_found() {
        let service = service();

        let err = service.token(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
