//! Service catalog repository module.

mod r#trait;
pub use r#trait::ServiceRepository;

mod mock;
pub use mock::MockServiceRepository;
