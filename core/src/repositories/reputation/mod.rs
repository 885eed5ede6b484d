//! Reputation outbox repository module.

mod r#trait;
pub use r#trait::ReputationEventRepository;

mod mock;
pub use mock::MockReputationEventRepository;
