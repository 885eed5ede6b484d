//! Time-token entity: the unit of value in the Momentous ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest mintable denomination (15 minutes)
pub const MIN_DENOMINATION_MINUTES: i32 = 15;

/// Denominations must be a multiple of this step (15 minutes)
pub const DENOMINATION_STEP_MINUTES: i32 = 15;

/// A discrete, denominated token of time held in the ledger
///
/// Tokens are minted whole and stay whole: a purchase composes multiple
/// tokens rather than splitting one. They are never deleted — deactivation
/// retains the row for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeToken {
    /// Unique identifier for the token
    pub id: Uuid,

    /// User who originally minted the token
    pub issuer_id: Uuid,

    /// User who currently owns the token
    pub current_owner_id: Uuid,

    /// Face value in minutes; immutable after creation
    pub denomination: i32,

    /// Timestamp when the token was minted
    pub created_at: DateTime<Utc>,

    /// Optional expiry; an expired token can no longer be spent
    pub expires_at: Option<DateTime<Utc>>,

    /// Whether the token is still part of the spendable supply
    pub is_active: bool,

    /// Optimistic concurrency counter, bumped on every mutation
    pub version: i64,
}

impl TimeToken {
    /// Creates a new active token owned by its issuer
    ///
    /// Denomination validation is the minting service's responsibility;
    /// this constructor assumes an already-validated value.
    pub fn new(issuer_id: Uuid, denomination: i32, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            issuer_id,
            current_owner_id: issuer_id,
            denomination,
            created_at: Utc::now(),
            expires_at,
            is_active: true,
            version: 0,
        }
    }

    /// Checks whether a denomination is a positive multiple of 15 minutes
    pub fn is_valid_denomination(denomination: i32) -> bool {
        denomination >= MIN_DENOMINATION_MINUTES
            && denomination % DENOMINATION_STEP_MINUTES == 0
    }

    /// Checks whether the token has expired as of the given instant
    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= as_of,
            None => false,
        }
    }

    /// Checks whether the token can be selected or transferred
    pub fn is_spendable(&self, as_of: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(as_of)
    }
}
