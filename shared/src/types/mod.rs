//! Common types shared across the Momentous backend.

pub mod response;

pub use response::{ErrorResponse, HealthResponse};
