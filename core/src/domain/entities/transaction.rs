//! Transaction entity: an atomic transfer of a token set between users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a transaction
///
/// Created `Pending` and transitions exactly once to a terminal state;
/// a terminal transaction is never re-opened. Serialized lowercase — the
/// UI compares the raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Failed,
}

impl TransactionStatus {
    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Wire string for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A transfer of a token set from sender to recipient, optionally tied to
/// a service purchase
///
/// The engine never holds authoritative token state here; `token_ids` is
/// an ordered reference into the Token Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: Uuid,

    /// User spending the tokens
    pub sender_id: Uuid,

    /// User receiving the tokens
    pub recipient_id: Uuid,

    /// Service being purchased, when the transfer pays for one
    pub service_id: Option<Uuid>,

    /// Ordered token set being transferred
    pub token_ids: Vec<Uuid>,

    /// Current lifecycle state
    pub status: TransactionStatus,

    /// Ledger error code recorded when the transaction failed
    pub failure_reason: Option<String>,

    /// Timestamp when the transaction was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of successful completion
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Creates a new pending transaction
    pub fn new(
        sender_id: Uuid,
        recipient_id: Uuid,
        service_id: Option<Uuid>,
        token_ids: Vec<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            service_id,
            token_ids,
            status: TransactionStatus::Pending,
            failure_reason: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Marks the transaction completed; returns false if it already left
    /// the pending state
    pub fn complete(&mut self, completed_at: DateTime<Utc>) -> bool {
        if self.status != TransactionStatus::Pending {
            return false;
        }
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(completed_at);
        true
    }

    /// Marks the transaction failed with an audit reason; returns false if
    /// it already left the pending state
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.status != TransactionStatus::Pending {
            return false;
        }
        self.status = TransactionStatus::Failed;
        self.failure_reason = Some(reason.into());
        true
    }

    /// Marks the transaction cancelled; returns false if it already left
    /// the pending state
    pub fn cancel(&mut self) -> bool {
        if self.status != TransactionStatus::Pending {
            return false;
        }
        self.status = TransactionStatus::Cancelled;
        true
    }

    /// Whether the given user is a party to this transaction
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transaction() -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            vec![Uuid::new_v4(), Uuid::new_v4()],
        )
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let txn = sample_transaction();
        assert_eq!(txn.status, TransactionStatus::Pending);
        assert!(txn.completed_at.is_none());
        assert!(txn.failure_reason.is_none());
    }

    #[test]
    fn test_terminal_states_never_reopen() {
        let mut txn = sample_transaction();
        assert!(txn.complete(Utc::now()));

        assert!(!txn.fail("OWNERSHIP_MISMATCH"));
        assert!(!txn.cancel());
        assert_eq!(txn.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_fail_records_reason() {
        let mut txn = sample_transaction();
        assert!(txn.fail("TOKEN_INACTIVE"));

        assert_eq!(txn.status, TransactionStatus::Failed);
        assert_eq!(txn.failure_reason.as_deref(), Some("TOKEN_INACTIVE"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "completed", "cancelled", "failed"] {
            let status: TransactionStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!("refunded".parse::<TransactionStatus>().is_err());
    }
}
