//! # Momentous Core
//!
//! Core business logic and domain layer for the Momentous backend.
//! This crate contains the time-token ledger entities, the exchange and
//! marketplace services, repository interfaces, and error types. It has
//! no database or HTTP dependencies; infrastructure concerns live in
//! `mo_infra` and the HTTP surface in `mo_api`.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export the most commonly used types for convenience
pub use errors::{DomainError, DomainResult, LedgerError};
