//! Reputation settlement module
//!
//! The reputation scoring formula belongs to the external profile service;
//! this module only guarantees that `notify_reputation` fires exactly once
//! per party per completed transaction, via the transactional outbox.

mod dispatcher;
mod notifier;

pub use dispatcher::{DispatchOutcome, ReputationDispatcher};
pub use notifier::ReputationNotifier;
