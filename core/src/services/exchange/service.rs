//! Transaction engine: atomic token transfers between users.
//!
//! Orchestrates the pending → terminal state machine over the Token Store.
//! The store itself guarantees per-token atomicity; this service adds
//! payment validation, bounded storage timeouts, the cancellation guard,
//! the reputation outbox hand-off, and startup reconciliation.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::transaction::{Transaction, TransactionStatus};
use crate::errors::{DomainError, DomainResult, LedgerError};
use crate::repositories::{
    ReputationEventRepository, ServiceRepository, TokenRepository, TransactionRepository,
};
use crate::services::reputation::{ReputationDispatcher, ReputationNotifier};

use super::config::ExchangeConfig;
use super::selection::select_tokens;

/// Failure code recorded by reconciliation for transfers the crash
/// interrupted before commit
const INTERRUPTED_CODE: &str = "INTERRUPTED";

/// Summary of a startup reconciliation pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Pending transactions whose tokens had already moved; completed
    pub completed: usize,
    /// Pending transactions whose transfer never committed; failed
    pub failed: usize,
}

/// The transaction engine
pub struct ExchangeService<T, X, S, E, N>
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
{
    tokens: Arc<T>,
    transactions: Arc<X>,
    services: Arc<S>,
    dispatcher: Arc<ReputationDispatcher<E, N>>,
    config: ExchangeConfig,
    /// Transactions whose token transfer is in flight; cancellation
    /// requests against these are rejected with `AlreadyProcessing`
    processing: Arc<Mutex<HashSet<Uuid>>>,
}

impl<T, X, S, E, N> ExchangeService<T, X, S, E, N>
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
{
    /// Create a new exchange service
    pub fn new(
        tokens: Arc<T>,
        transactions: Arc<X>,
        services: Arc<S>,
        dispatcher: Arc<ReputationDispatcher<E, N>>,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            tokens,
            transactions,
            services,
            dispatcher,
            config,
            processing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Create and execute a transaction
    ///
    /// When `token_ids` is absent the engine selects tokens from the
    /// sender's active holdings (which requires `service_id` to know the
    /// amount). Sufficiency is re-validated regardless of who chose the
    /// set.
    ///
    /// Observed from any other reader this is a single atomic unit: either
    /// the transaction completes with every token reassigned, or it
    /// reaches `failed`/`cancelled` with no token moved.
    pub async fn create(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        service_id: Option<Uuid>,
        token_ids: Option<Vec<Uuid>>,
    ) -> DomainResult<Transaction> {
        if sender_id == recipient_id {
            return Err(DomainError::Validation {
                message: "sender and recipient must differ".to_string(),
            });
        }

        let service = match service_id {
            Some(id) => Some(self.services.find_by_id(id).await?.ok_or(
                DomainError::NotFound {
                    resource: format!("service {}", id),
                },
            )?),
            None => None,
        };

        let selected = match token_ids {
            Some(ids) => self.resolve_explicit_set(ids).await?,
            None => {
                let service = service.as_ref().ok_or(DomainError::Validation {
                    message: "automatic selection requires a service_id".to_string(),
                })?;
                let holdings = self
                    .tokens
                    .find_active_by_owner(sender_id, Utc::now())
                    .await?;
                select_tokens(&holdings, service.time_cost, self.config.selection_policy)?
            }
        };

        let offered: i32 = selected.iter().map(|t| t.denomination).sum();
        if let Some(service) = &service {
            if offered < service.time_cost {
                return Err(LedgerError::InsufficientPayment {
                    offered,
                    required: service.time_cost,
                }
                .into());
            }
        }

        let ids: Vec<Uuid> = selected.iter().map(|t| t.id).collect();
        let mut transaction = self
            .transactions
            .insert(Transaction::new(
                sender_id,
                recipient_id,
                service_id,
                ids.clone(),
            ))
            .await?;

        self.begin_processing(transaction.id);
        let result = self
            .execute_transfer(&mut transaction, &ids, sender_id, recipient_id)
            .await;
        self.end_processing(transaction.id);

        if result.is_ok() {
            // Best-effort immediate delivery; the background dispatcher
            // redelivers anything that stays queued
            self.dispatcher.dispatch_pending().await;
        }
        result.map(|_| transaction)
    }

    /// Cancel a pending transaction
    ///
    /// Allowed to the sender only, and only before the token transfer has
    /// begun; afterwards the request is rejected with `AlreadyProcessing`.
    pub async fn cancel(&self, transaction_id: Uuid, caller: Uuid) -> DomainResult<Transaction> {
        if self.is_processing(transaction_id) {
            return Err(LedgerError::AlreadyProcessing { transaction_id }.into());
        }

        let mut transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or(DomainError::NotFound {
                resource: format!("transaction {}", transaction_id),
            })?;

        if transaction.sender_id != caller {
            return Err(DomainError::Unauthorized);
        }
        if transaction.status.is_terminal() {
            return Err(LedgerError::AlreadyProcessing { transaction_id }.into());
        }

        if !self.transactions.mark_cancelled(transaction_id).await? {
            // Lost the CAS against a concurrent completion
            return Err(LedgerError::AlreadyProcessing { transaction_id }.into());
        }

        transaction.cancel();
        info!(transaction_id = %transaction_id, "Transaction cancelled");
        Ok(transaction)
    }

    /// Transactions involving the user, newest first
    pub async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> DomainResult<Vec<Transaction>> {
        let limit = limit
            .unwrap_or(self.config.recent_default_limit)
            .min(self.config.recent_max_limit);
        self.transactions.list_for_user(user_id, limit).await
    }

    /// Re-derive the status of pending transactions after a restart
    ///
    /// A crash between the token transfer and the status update leaves a
    /// pending transaction whose tokens already moved. Token ownership is
    /// the authority: if every token in the set now belongs to the
    /// recipient the transfer committed, so the transaction is completed
    /// (outbox events included); otherwise it never committed and is
    /// failed. Idempotent — a second pass finds nothing pending.
    pub async fn reconcile_pending(&self) -> DomainResult<ReconcileReport> {
        let pending = self.transactions.list_pending().await?;
        let mut report = ReconcileReport::default();

        for transaction in pending {
            let tokens = self.tokens.find_by_ids(&transaction.token_ids).await?;
            let transferred = tokens.len() == transaction.token_ids.len()
                && tokens
                    .iter()
                    .all(|t| t.current_owner_id == transaction.recipient_id);

            if transferred {
                if self
                    .transactions
                    .mark_completed(transaction.id, Utc::now())
                    .await?
                {
                    warn!(
                        transaction_id = %transaction.id,
                        "Reconciled interrupted transaction as completed"
                    );
                    report.completed += 1;
                }
            } else if self
                .transactions
                .mark_failed(transaction.id, INTERRUPTED_CODE)
                .await?
            {
                warn!(
                    transaction_id = %transaction.id,
                    "Reconciled interrupted transaction as failed"
                );
                report.failed += 1;
            }
        }

        // Redeliver anything the crash left undispatched
        self.dispatcher.dispatch_pending().await;
        Ok(report)
    }

    /// Resolve and validate an explicit, caller-chosen token set
    ///
    /// Ownership and liveness are deliberately not checked here: they are
    /// authoritative only at transfer commit, where the store re-checks
    /// them under its lock.
    async fn resolve_explicit_set(
        &self,
        ids: Vec<Uuid>,
    ) -> DomainResult<Vec<crate::domain::entities::token::TimeToken>> {
        if ids.is_empty() {
            return Err(DomainError::Validation {
                message: "token_ids must not be empty".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(*id) {
                return Err(LedgerError::DuplicateToken { token_id: *id }.into());
            }
        }

        let tokens = self.tokens.find_by_ids(&ids).await?;
        if tokens.len() != ids.len() {
            let found: HashSet<Uuid> = tokens.iter().map(|t| t.id).collect();
            let missing = ids.iter().find(|id| !found.contains(id)).copied();
            return Err(DomainError::NotFound {
                resource: match missing {
                    Some(id) => format!("token {}", id),
                    None => "token".to_string(),
                },
            });
        }
        Ok(tokens)
    }

    /// Run the token transfer under the storage timeout and settle the
    /// transaction's terminal state
    async fn execute_transfer(
        &self,
        transaction: &mut Transaction,
        ids: &[Uuid],
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> DomainResult<()> {
        let transfer = tokio::time::timeout(
            self.config.storage_timeout,
            self.tokens.transfer_many(ids, sender_id, recipient_id),
        )
        .await;

        let transfer_error: DomainError = match transfer {
            Ok(Ok(_)) => {
                let completed_at = Utc::now();
                if self
                    .transactions
                    .mark_completed(transaction.id, completed_at)
                    .await?
                {
                    transaction.complete(completed_at);
                    info!(
                        transaction_id = %transaction.id,
                        sender_id = %sender_id,
                        recipient_id = %recipient_id,
                        tokens = ids.len(),
                        "Transaction completed"
                    );
                    return Ok(());
                }
                // A cancellation won the status CAS before the transfer
                // committed; undo the transfer and report the conflict
                if let Err(e) = self
                    .tokens
                    .transfer_many(ids, recipient_id, sender_id)
                    .await
                {
                    error!(
                        transaction_id = %transaction.id,
                        "Compensating transfer after cancellation race failed: {}", e
                    );
                }
                transaction.cancel();
                return Err(LedgerError::AlreadyProcessing {
                    transaction_id: transaction.id,
                }
                .into());
            }
            // The dropped transfer future rolls the storage transaction
            // back, so a timed-out transfer is failed, never half-applied
            Err(_elapsed) => LedgerError::StorageTimeout.into(),
            Ok(Err(e)) => e,
        };

        // Record the terminal failure for audit, then surface the specific
        // error; conflicting transfers are never silently retried because
        // the caller's chosen token set may no longer be valid
        let code = transfer_error.code();
        if let Err(e) = self.transactions.mark_failed(transaction.id, code).await {
            error!(
                transaction_id = %transaction.id,
                "Failed to record transaction failure: {}", e
            );
        }
        transaction.fail(code);
        warn!(
            transaction_id = %transaction.id,
            code,
            "Transaction failed"
        );
        Err(transfer_error)
    }

    // A poisoned lock only means a panicked holder; the set itself is
    // still a plain HashSet, so recover the guard rather than propagate
    fn processing_set(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.processing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_processing(&self, id: Uuid) {
        self.processing_set().insert(id);
    }

    fn end_processing(&self, id: Uuid) {
        self.processing_set().remove(&id);
    }

    fn is_processing(&self, id: Uuid) -> bool {
        self.processing_set().contains(&id)
    }

    /// Look up a single transaction visible to one of its parties
    pub async fn transaction_for_user(
        &self,
        transaction_id: Uuid,
        caller: Uuid,
    ) -> DomainResult<Transaction> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or(DomainError::NotFound {
                resource: format!("transaction {}", transaction_id),
            })?;
        if !transaction.involves(caller) {
            return Err(DomainError::Unauthorized);
        }
        Ok(transaction)
    }

    /// Whether a transaction has reached a terminal state
    pub async fn is_settled(&self, transaction_id: Uuid) -> DomainResult<bool> {
        Ok(self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .map(|t| t.status != TransactionStatus::Pending)
            .unwrap_or(false))
    }
}
