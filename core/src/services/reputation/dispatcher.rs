//! Reputation outbox dispatcher.
//!
//! Drains undispatched reputation events through the notifier. A failed
//! notification stays queued and is retried on the next dispatch, which is
//! what turns the outbox's at-least-once delivery into an effectively
//! exactly-once hook: `mark_dispatched` is a compare-and-swap, so no event
//! is ever delivered-and-marked twice.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::repositories::ReputationEventRepository;

use super::notifier::ReputationNotifier;

/// Events fetched per dispatch cycle
const DISPATCH_BATCH_LIMIT: usize = 100;

/// Result of one dispatch cycle
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Events delivered and marked dispatched
    pub dispatched: usize,
    /// Events that failed delivery and stay queued
    pub failed: usize,
}

/// Drains the reputation outbox through a notifier
pub struct ReputationDispatcher<E, N>
where
    E: ReputationEventRepository,
    N: ReputationNotifier,
{
    events: Arc<E>,
    notifier: Arc<N>,
}

impl<E, N> ReputationDispatcher<E, N>
where
    E: ReputationEventRepository,
    N: ReputationNotifier,
{
    /// Create a new dispatcher
    pub fn new(events: Arc<E>, notifier: Arc<N>) -> Self {
        Self { events, notifier }
    }

    /// Deliver one batch of pending events
    ///
    /// Never returns an error: outbox draining is background work, and a
    /// failure now is simply retried on the next cycle.
    pub async fn dispatch_pending(&self) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        let pending = match self.events.pending_events(DISPATCH_BATCH_LIMIT).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Could not read reputation outbox, will retry: {}", e);
                return outcome;
            }
        };

        for event in pending {
            match self
                .notifier
                .notify_reputation(event.user_id, event.transaction_id)
                .await
            {
                Ok(()) => match self.events.mark_dispatched(event.id, Utc::now()).await {
                    Ok(true) => outcome.dispatched += 1,
                    // Another dispatcher won the CAS; nothing to do
                    Ok(false) => {}
                    Err(e) => {
                        error!(event_id = %event.id, "Failed to mark event dispatched: {}", e);
                        outcome.failed += 1;
                    }
                },
                Err(e) => {
                    warn!(
                        event_id = %event.id,
                        user_id = %event.user_id,
                        "Reputation notification failed, event stays queued: {}", e
                    );
                    outcome.failed += 1;
                }
            }
        }

        if outcome.dispatched > 0 {
            info!(
                dispatched = outcome.dispatched,
                failed = outcome.failed,
                "Reputation events dispatched"
            );
        }
        outcome
    }

    /// Start the dispatcher as a background task retrying on an interval
    pub fn start_background_task(self: Arc<Self>, interval_seconds: u64)
    where
        E: 'static,
        N: 'static,
    {
        let interval = std::time::Duration::from_secs(interval_seconds);

        tokio::spawn(async move {
            info!(
                "Reputation dispatcher started - will run every {} seconds",
                interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;
                self.dispatch_pending().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::reputation::ReputationEvent;
    use crate::repositories::MockReputationEventRepository;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Notifier recording calls, optionally failing
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
        async fn notify_reputation(
            &self,
            user_id: Uuid,
            transaction_id: Uuid,
        ) -> Result<(), String> {
            if *self.fail.lock().unwrap() {
                return Err("profile service unreachable".to_string());
            }
            self.calls.lock().unwrap().push((user_id, transaction_id));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_and_marks_events() {
        let outbox = MockReputationEventRepository::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = ReputationDispatcher::new(Arc::new(outbox.clone()), notifier.clone());

        let txn_id = Uuid::new_v4();
        outbox.enqueue(ReputationEvent::new(txn_id, Uuid::new_v4())).await;
        outbox.enqueue(ReputationEvent::new(txn_id, Uuid::new_v4())).await;

        let outcome = dispatcher.dispatch_pending().await;

        assert_eq!(outcome.dispatched, 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(notifier.calls().len(), 2);
        assert!(outbox.all_events().await.iter().all(|e| e.is_dispatched()));
    }

    #[tokio::test]
    async fn test_failed_delivery_stays_queued_for_redelivery() {
        let outbox = MockReputationEventRepository::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = ReputationDispatcher::new(Arc::new(outbox.clone()), notifier.clone());

        outbox
            .enqueue(ReputationEvent::new(Uuid::new_v4(), Uuid::new_v4()))
            .await;

        notifier.set_fail(true);
        let outcome = dispatcher.dispatch_pending().await;
        assert_eq!(outcome.dispatched, 0);
        assert_eq!(outcome.failed, 1);

        // Next cycle succeeds and delivers exactly once
        notifier.set_fail(false);
        let outcome = dispatcher.dispatch_pending().await;
        assert_eq!(outcome.dispatched, 1);
        assert_eq!(notifier.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_is_exactly_once_per_event() {
        let outbox = MockReputationEventRepository::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = ReputationDispatcher::new(Arc::new(outbox.clone()), notifier.clone());

        outbox
            .enqueue(ReputationEvent::new(Uuid::new_v4(), Uuid::new_v4()))
            .await;

        dispatcher.dispatch_pending().await;
        let outcome = dispatcher.dispatch_pending().await;

        assert_eq!(outcome, DispatchOutcome::default());
        assert_eq!(notifier.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_outbox_read_failure_is_non_fatal() {
        let outbox = MockReputationEventRepository::new();
        outbox.set_should_fail(true).await;
        let dispatcher = ReputationDispatcher::new(
            Arc::new(outbox.clone()),
            Arc::new(RecordingNotifier::default()),
        );

        let outcome = dispatcher.dispatch_pending().await;
        assert_eq!(outcome, DispatchOutcome::default());
    }
}
