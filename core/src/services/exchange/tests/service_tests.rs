//! End-to-end exchange engine tests over the in-memory mocks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use uuid::Uuid;

use crate::domain::entities::service::Service;
use crate::domain::entities::token::TimeToken;
use crate::domain::entities::transaction::{Transaction, TransactionStatus};
use crate::errors::{DomainError, LedgerError};
use crate::repositories::{
    MockReputationEventRepository, MockServiceRepository, MockTokenRepository,
    MockTransactionRepository, TokenRepository, TransactionRepository,
};
use crate::services::exchange::{ExchangeConfig, ExchangeService, ReconcileReport};
use crate::services::reputation::{ReputationDispatcher, ReputationNotifier};

use crate::repositories::ServiceRepository;

/// Notifier recording every delivery, optionally failing
#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(Uuid, Uuid)>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    fn calls(&self) -> Vec<(Uuid, Uuid)> {
        self.calls.lock().unwrap().clone()
    }

    fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl ReputationNotifier for RecordingNotifier {
    async fn notify_reputation(&self, user_id: Uuid, transaction_id: Uuid) -> Result<(), String> {
        if *self.fail.lock().unwrap() {
            return Err("profile service unreachable".to_string());
        }
        self.calls.lock().unwrap().push((user_id, transaction_id));
        Ok(())
    }
}

type TestEngine<T> = ExchangeService<
    T,
    MockTransactionRepository,
    MockServiceRepository,
    MockReputationEventRepository,
    RecordingNotifier,
>;

struct Harness {
    tokens: Arc<MockTokenRepository>,
    transactions: Arc<MockTransactionRepository>,
    services: Arc<MockServiceRepository>,
    outbox: MockReputationEventRepository,
    notifier: Arc<RecordingNotifier>,
    engine: TestEngine<MockTokenRepository>,
}

fn harness() -> Harness {
    harness_with_config(ExchangeConfig::default())
}

fn harness_with_config(config: ExchangeConfig) -> Harness {
    let tokens = Arc::new(MockTokenRepository::new());
    let outbox = MockReputationEventRepository::new();
    let transactions = Arc::new(MockTransactionRepository::with_outbox(outbox.clone()));
    let services = Arc::new(MockServiceRepository::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = Arc::new(ReputationDispatcher::new(
        Arc::new(outbox.clone()),
        notifier.clone(),
    ));

    let engine = ExchangeService::new(
        tokens.clone(),
        transactions.clone(),
        services.clone(),
        dispatcher,
        config,
    );

    Harness {
        tokens,
        transactions,
        services,
        outbox,
        notifier,
        engine,
    }
}

async fn mint(harness: &Harness, owner: Uuid, denomination: i32) -> TimeToken {
    harness
        .tokens
        .insert(TimeToken::new(owner, denomination, None))
        .await
        .unwrap()
}

async fn listing(harness: &Harness, provider: Uuid, time_cost: i32) -> Service {
    harness
        .services
        .insert(Service::new(
            provider,
            "Guitar lesson".to_string(),
            "One-on-one beginner lesson".to_string(),
            time_cost,
            vec!["music".to_string()],
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_purchase_moves_tokens_and_completes() {
    // Alice mints a 60-minute token and buys Bob's 45-minute lesson
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let token = mint(&harness, alice, 60).await;
    let lesson = listing(&harness, bob, 45).await;

    let transaction = harness
        .engine
        .create(alice, bob, Some(lesson.id), None)
        .await
        .unwrap();

    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert!(transaction.completed_at.is_some());
    assert_eq!(transaction.token_ids, vec![token.id]);

    // The whole token moves; no change is minted
    assert_eq!(harness.tokens.active_balance(alice).await, 0);
    assert_eq!(harness.tokens.active_balance(bob).await, 60);

    let moved = harness.tokens.find_by_id(token.id).await.unwrap().unwrap();
    assert_eq!(moved.current_owner_id, bob);
    assert_eq!(moved.version, token.version + 1);
}

#[tokio::test]
async fn test_transfers_conserve_total_supply() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    mint(&harness, alice, 30).await;
    mint(&harness, alice, 45).await;
    mint(&harness, bob, 15).await;
    let lesson = listing(&harness, bob, 60).await;

    assert_eq!(harness.tokens.total_supply().await, 90);

    harness
        .engine
        .create(alice, bob, Some(lesson.id), None)
        .await
        .unwrap();

    assert_eq!(harness.tokens.total_supply().await, 90);
    assert_eq!(
        harness.tokens.active_balance(alice).await + harness.tokens.active_balance(bob).await,
        90
    );
}

#[tokio::test]
async fn test_concurrent_double_spend_admits_exactly_one() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let carol = Uuid::new_v4();

    let token = mint(&harness, alice, 60).await;
    let ids = vec![token.id];

    let (to_bob, to_carol) = tokio::join!(
        harness.engine.create(alice, bob, None, Some(ids.clone())),
        harness.engine.create(alice, carol, None, Some(ids.clone())),
    );

    let (winner_recipient, loser) = match (&to_bob, &to_carol) {
        (Ok(_), Err(e)) => (bob, e),
        (Err(e), Ok(_)) => (carol, e),
        other => panic!("expected exactly one success, got {:?}", other),
    };

    assert!(matches!(
        loser,
        DomainError::Ledger(LedgerError::OwnershipMismatch { .. })
    ));

    let moved = harness.tokens.find_by_id(token.id).await.unwrap().unwrap();
    assert_eq!(moved.current_owner_id, winner_recipient);
    assert_eq!(harness.tokens.active_balance(alice).await, 0);
    assert_eq!(harness.tokens.active_balance(winner_recipient).await, 60);
}

#[tokio::test]
async fn test_failed_transfer_records_failure_reason() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let carol = Uuid::new_v4();

    // Carol tries to spend Alice's token
    let token = mint(&harness, alice, 30).await;
    let err = harness
        .engine
        .create(carol, bob, None, Some(vec![token.id]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Ledger(LedgerError::OwnershipMismatch { .. })
    ));

    let failed = harness
        .transactions
        .list_for_user(carol, 10)
        .await
        .unwrap()
        .pop()
        .unwrap();
    assert_eq!(failed.status, TransactionStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("OWNERSHIP_MISMATCH"));
}

#[tokio::test]
async fn test_insufficient_payment_is_rejected_before_transfer() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let token = mint(&harness, alice, 30).await;
    let lesson = listing(&harness, bob, 45).await;

    let err = harness
        .engine
        .create(alice, bob, Some(lesson.id), Some(vec![token.id]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::Ledger(LedgerError::InsufficientPayment {
            offered: 30,
            required: 45,
        })
    );

    // Nothing was recorded or moved
    assert!(harness
        .transactions
        .list_for_user(alice, 10)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(harness.tokens.active_balance(alice).await, 30);
}

#[tokio::test]
async fn test_auto_selection_with_insufficient_holdings() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    mint(&harness, alice, 15).await;
    let lesson = listing(&harness, bob, 60).await;

    let err = harness
        .engine
        .create(alice, bob, Some(lesson.id), None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::Ledger(LedgerError::InsufficientFunds {
            available: 15,
            required: 60,
        })
    );
}

#[tokio::test]
async fn test_explicit_set_validation() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let token = mint(&harness, alice, 30).await;

    let empty = harness
        .engine
        .create(alice, bob, None, Some(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(empty, DomainError::Validation { .. }));

    let duplicated = harness
        .engine
        .create(alice, bob, None, Some(vec![token.id, token.id]))
        .await
        .unwrap_err();
    assert_eq!(
        duplicated,
        DomainError::Ledger(LedgerError::DuplicateToken { token_id: token.id })
    );

    let unknown = Uuid::new_v4();
    let missing = harness
        .engine
        .create(alice, bob, None, Some(vec![unknown]))
        .await
        .unwrap_err();
    assert!(matches!(missing, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_self_transfer_is_rejected() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let token = mint(&harness, alice, 30).await;

    let err = harness
        .engine
        .create(alice, alice, None, Some(vec![token.id]))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_auto_selection_requires_a_service() {
    let harness = harness();

    let err = harness
        .engine
        .create(Uuid::new_v4(), Uuid::new_v4(), None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { .. }));
}

#[tokio::test]
async fn test_unknown_service_is_not_found() {
    let harness = harness();

    let err = harness
        .engine
        .create(Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_cancel_pending_transaction() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let pending = harness
        .transactions
        .insert(Transaction::new(alice, bob, None, vec![Uuid::new_v4()]))
        .await
        .unwrap();

    let cancelled = harness.engine.cancel(pending.id, alice).await.unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);

    let stored = harness.transactions.get(pending.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_is_sender_only() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let pending = harness
        .transactions
        .insert(Transaction::new(alice, bob, None, vec![Uuid::new_v4()]))
        .await
        .unwrap();

    // Even the recipient may not cancel
    let err = harness.engine.cancel(pending.id, bob).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
}

#[tokio::test]
async fn test_cancel_after_settlement_is_a_conflict() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let token = mint(&harness, alice, 60).await;
    let lesson = listing(&harness, bob, 60).await;
    let completed = harness
        .engine
        .create(alice, bob, Some(lesson.id), Some(vec![token.id]))
        .await
        .unwrap();

    let err = harness.engine.cancel(completed.id, alice).await.unwrap_err();
    assert_eq!(
        err,
        DomainError::Ledger(LedgerError::AlreadyProcessing {
            transaction_id: completed.id,
        })
    );
}

#[tokio::test]
async fn test_cancel_unknown_transaction() {
    let harness = harness();
    let err = harness
        .engine
        .cancel(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

/// Token store whose transfers stall, to exercise the storage timeout
struct StalledTokenRepository {
    inner: MockTokenRepository,
    transfer_delay: Duration,
}

#[async_trait]
impl TokenRepository for StalledTokenRepository {
    async fn insert(&self, token: TimeToken) -> Result<TimeToken, DomainError> {
        self.inner.insert(token).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeToken>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TimeToken>, DomainError> {
        self.inner.find_by_ids(ids).await
    }

    async fn find_active_by_owner(
        &self,
        owner_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<TimeToken>, DomainError> {
        self.inner.find_active_by_owner(owner_id, as_of).await
    }

    async fn transfer_many(
        &self,
        token_ids: &[Uuid],
        from_owner_id: Uuid,
        to_owner_id: Uuid,
    ) -> Result<Vec<TimeToken>, DomainError> {
        tokio::time::sleep(self.transfer_delay).await;
        self.inner
            .transfer_many(token_ids, from_owner_id, to_owner_id)
            .await
    }

    async fn deactivate_expired(&self, as_of: DateTime<Utc>) -> Result<u64, DomainError> {
        self.inner.deactivate_expired(as_of).await
    }
}

#[tokio::test]
async fn test_stalled_transfer_times_out_and_fails_the_transaction() {
    let tokens = Arc::new(StalledTokenRepository {
        inner: MockTokenRepository::new(),
        transfer_delay: Duration::from_millis(200),
    });
    let outbox = MockReputationEventRepository::new();
    let transactions = Arc::new(MockTransactionRepository::with_outbox(outbox.clone()));
    let services = Arc::new(MockServiceRepository::new());
    let dispatcher = Arc::new(ReputationDispatcher::new(
        Arc::new(outbox),
        Arc::new(RecordingNotifier::default()),
    ));
    let engine: TestEngine<StalledTokenRepository> = ExchangeService::new(
        tokens.clone(),
        transactions.clone(),
        services,
        dispatcher,
        ExchangeConfig::default().with_storage_timeout(Duration::from_millis(20)),
    );

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let token = tokens.insert(TimeToken::new(alice, 30, None)).await.unwrap();

    let err = engine
        .create(alice, bob, None, Some(vec![token.id]))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Ledger(LedgerError::StorageTimeout));

    let failed = transactions
        .list_for_user(alice, 10)
        .await
        .unwrap()
        .pop()
        .unwrap();
    assert_eq!(failed.status, TransactionStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("STORAGE_TIMEOUT"));
}

#[tokio::test]
async fn test_completion_dispatches_both_reputation_events_once() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    mint(&harness, alice, 45).await;
    let lesson = listing(&harness, bob, 45).await;
    let transaction = harness
        .engine
        .create(alice, bob, Some(lesson.id), None)
        .await
        .unwrap();

    let calls = harness.notifier.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&(alice, transaction.id)));
    assert!(calls.contains(&(bob, transaction.id)));
    assert!(harness
        .outbox
        .all_events()
        .await
        .iter()
        .all(|e| e.is_dispatched()));
}

#[tokio::test]
async fn test_undelivered_reputation_events_survive_for_redelivery() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    mint(&harness, alice, 45).await;
    let lesson = listing(&harness, bob, 45).await;

    // The profile service is down during settlement
    harness.notifier.set_fail(true);
    let transaction = harness
        .engine
        .create(alice, bob, Some(lesson.id), None)
        .await
        .unwrap();
    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert!(harness.notifier.calls().is_empty());

    // Reconciliation (or the background dispatcher) redelivers later
    harness.notifier.set_fail(false);
    harness.engine.reconcile_pending().await.unwrap();
    assert_eq!(harness.notifier.calls().len(), 2);
}

#[tokio::test]
async fn test_reconcile_completes_transactions_whose_tokens_moved() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    // A crash after the transfer committed but before the status update:
    // the token already belongs to Bob while the transaction is pending
    let mut token = TimeToken::new(alice, 60, None);
    token.current_owner_id = bob;
    let token = harness.tokens.insert(token).await.unwrap();
    let interrupted = harness
        .transactions
        .insert(Transaction::new(alice, bob, None, vec![token.id]))
        .await
        .unwrap();

    let report = harness.engine.reconcile_pending().await.unwrap();
    assert_eq!(
        report,
        ReconcileReport {
            completed: 1,
            failed: 0,
        }
    );

    let settled = harness.transactions.get(interrupted.id).await.unwrap();
    assert_eq!(settled.status, TransactionStatus::Completed);
    assert_eq!(harness.notifier.calls().len(), 2);
}

#[tokio::test]
async fn test_reconcile_fails_transactions_whose_transfer_never_committed() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let token = mint(&harness, alice, 60).await;
    let interrupted = harness
        .transactions
        .insert(Transaction::new(alice, bob, None, vec![token.id]))
        .await
        .unwrap();

    let report = harness.engine.reconcile_pending().await.unwrap();
    assert_eq!(
        report,
        ReconcileReport {
            completed: 0,
            failed: 1,
        }
    );

    let settled = harness.transactions.get(interrupted.id).await.unwrap();
    assert_eq!(settled.status, TransactionStatus::Failed);
    assert_eq!(settled.failure_reason.as_deref(), Some("INTERRUPTED"));
    assert!(harness.notifier.calls().is_empty());

    // A second pass finds nothing pending
    let report = harness.engine.reconcile_pending().await.unwrap();
    assert_eq!(report, ReconcileReport::default());
}

#[tokio::test]
async fn test_recent_for_user_is_newest_first_and_clamped() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let base = Utc::now() - ChronoDuration::hours(3);
    let mut ids = Vec::new();
    for hour in 0..3 {
        let mut transaction = Transaction::new(alice, bob, None, vec![Uuid::new_v4()]);
        transaction.created_at = base + ChronoDuration::hours(hour);
        ids.push(transaction.id);
        harness.transactions.insert(transaction).await.unwrap();
    }

    let recent = harness.engine.recent_for_user(alice, None).await.unwrap();
    assert_eq!(
        recent.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![ids[2], ids[1], ids[0]]
    );

    let limited = harness.engine.recent_for_user(alice, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, ids[2]);

    // An oversized limit is clamped rather than rejected
    let clamped = harness
        .engine
        .recent_for_user(alice, Some(100_000))
        .await
        .unwrap();
    assert_eq!(clamped.len(), 3);

    // A stranger sees nothing
    let stranger = harness
        .engine
        .recent_for_user(Uuid::new_v4(), None)
        .await
        .unwrap();
    assert!(stranger.is_empty());
}

#[tokio::test]
async fn test_transaction_visibility_is_party_only() {
    let harness = harness();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let token = mint(&harness, alice, 30).await;
    let transaction = harness
        .engine
        .create(alice, bob, None, Some(vec![token.id]))
        .await
        .unwrap();

    assert!(harness
        .engine
        .transaction_for_user(transaction.id, alice)
        .await
        .is_ok());
    assert!(harness
        .engine
        .transaction_for_user(transaction.id, bob)
        .await
        .is_ok());

    let err = harness
        .engine
        .transaction_for_user(transaction.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));

    assert!(harness.engine.is_settled(transaction.id).await.unwrap());
}
