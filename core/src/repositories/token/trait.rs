//! Token repository trait defining the interface for the Token Store.
//!
//! The Token Store is the sole owner of token records and the only shared
//! mutable resource in the system. Implementations must make `transfer_many`
//! and `deactivate_expired` mutually exclusive per token (row locks or a
//! compare-and-swap on the token `version`), so two transfers over disjoint
//! token sets proceed in parallel while overlapping sets conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::TimeToken;
use crate::errors::DomainError;

/// Repository trait for TimeToken persistence operations
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist a newly minted token
    ///
    /// # Arguments
    /// * `token` - The token to persist
    ///
    /// # Returns
    /// * `Ok(TimeToken)` - The saved token
    /// * `Err(DomainError)` - Save failed
    async fn insert(&self, token: TimeToken) -> Result<TimeToken, DomainError>;

    /// Find a token by its id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeToken>, DomainError>;

    /// Find tokens by id, in the order the ids were given
    ///
    /// Unknown ids are simply absent from the result; callers compare
    /// lengths to detect them.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TimeToken>, DomainError>;

    /// The owner's current spendable holdings
    ///
    /// Returns only active, unexpired tokens, ordered ascending by
    /// `(denomination, created_at)` so selection sees a stable sequence.
    ///
    /// # Arguments
    /// * `owner_id` - The owner whose holdings to list
    /// * `as_of` - Instant used for the expiry check
    async fn find_active_by_owner(
        &self,
        owner_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<TimeToken>, DomainError>;

    /// Atomically reassign a set of tokens from one owner to another
    ///
    /// Either every token in the list is reassigned (with its version
    /// bumped) or none is; no partial transfer is ever observable.
    ///
    /// # Errors
    /// * `LedgerError::DuplicateToken` - `token_ids` contains repeats
    /// * `LedgerError::OwnershipMismatch` - a token is unknown or not owned
    ///   by `from_owner_id` at commit time
    /// * `LedgerError::TokenInactive` - a token is inactive or expired
    ///
    /// # Returns
    /// * `Ok(Vec<TimeToken>)` - The tokens after reassignment
    async fn transfer_many(
        &self,
        token_ids: &[Uuid],
        from_owner_id: Uuid,
        to_owner_id: Uuid,
    ) -> Result<Vec<TimeToken>, DomainError>;

    /// Deactivate every active token whose expiry has passed
    ///
    /// Idempotent: a second immediate call deactivates nothing. Safe to run
    /// concurrently with transfers — a token mid-transfer is either fully
    /// transferred before deactivation takes effect, or the deactivation
    /// wins and the transfer fails; never both.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of tokens newly deactivated
    async fn deactivate_expired(&self, as_of: DateTime<Utc>) -> Result<u64, DomainError>;
}
