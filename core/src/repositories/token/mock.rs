//! Mock implementation of TokenRepository for testing.
//!
//! All mutations run under a single write lock with full validation before
//! any state change, which gives the mock the same atomicity guarantees as
//! the MySQL implementation's compare-and-swap transaction: a failing
//! `transfer_many` leaves nothing half-moved, and two concurrent transfers
//! over an overlapping token set cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::TimeToken;
use crate::errors::{DomainError, LedgerError};

use super::TokenRepository;

/// In-memory mock of the Token Store
#[derive(Clone, Default)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, TimeToken>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockTokenRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether operations should fail with a storage error
    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Sum of spendable denominations currently owned by a user
    pub async fn active_balance(&self, owner_id: Uuid) -> i32 {
        let now = Utc::now();
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.current_owner_id == owner_id && t.is_spendable(now))
            .map(|t| t.denomination)
            .sum()
    }

    /// Total token value in the ledger, active and inactive
    pub async fn total_supply(&self) -> i32 {
        self.tokens.read().await.values().map(|t| t.denomination).sum()
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
impl TokenRepository for MockTokenRepository {
    async fn insert(&self, token: TimeToken) -> Result<TimeToken, DomainError> {
        self.fail_if_requested().await?;

        let mut tokens = self.tokens.write().await;
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeToken>, DomainError> {
        self.fail_if_requested().await?;

        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TimeToken>, DomainError> {
        self.fail_if_requested().await?;

        let tokens = self.tokens.read().await;
        Ok(ids.iter().filter_map(|id| tokens.get(id).cloned()).collect())
    }

    async fn find_active_by_owner(
        &self,
        owner_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<TimeToken>, DomainError> {
        self.fail_if_requested().await?;

        let tokens = self.tokens.read().await;
        let mut holdings: Vec<TimeToken> = tokens
            .values()
            .filter(|t| t.current_owner_id == owner_id && t.is_spendable(as_of))
            .cloned()
            .collect();

        holdings.sort_by(|a, b| {
            a.denomination
                .cmp(&b.denomination)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(holdings)
    }

    async fn transfer_many(
        &self,
        token_ids: &[Uuid],
        from_owner_id: Uuid,
        to_owner_id: Uuid,
    ) -> Result<Vec<TimeToken>, DomainError> {
        self.fail_if_requested().await?;

        let mut tokens = self.tokens.write().await;
        let now = Utc::now();

        // Validate the full set before mutating anything
        let mut seen = HashSet::new();
        for id in token_ids {
            if !seen.insert(*id) {
                return Err(LedgerError::DuplicateToken { token_id: *id }.into());
            }
            let token = tokens
                .get(id)
                .ok_or(LedgerError::OwnershipMismatch { token_id: *id })?;
            if token.current_owner_id != from_owner_id {
                return Err(LedgerError::OwnershipMismatch { token_id: *id }.into());
            }
            if !token.is_spendable(now) {
                return Err(LedgerError::TokenInactive { token_id: *id }.into());
            }
        }

        let mut transferred = Vec::with_capacity(token_ids.len());
        for id in token_ids {
            let token = tokens.get_mut(id).expect("validated above");
            token.current_owner_id = to_owner_id;
            token.version += 1;
            transferred.push(token.clone());
        }
        Ok(transferred)
    }

    async fn deactivate_expired(&self, as_of: DateTime<Utc>) -> Result<u64, DomainError> {
        self.fail_if_requested().await?;

        let mut tokens = self.tokens.write().await;
        let mut count = 0;
        for token in tokens.values_mut() {
            if token.is_active && token.is_expired(as_of) {
                token.is_active = false;
                token.version += 1;
                count += 1;
            }
        }
        Ok(count)
    }
}
