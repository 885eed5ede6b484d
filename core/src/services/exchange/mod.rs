//! Exchange engine module
//!
//! This module provides the heart of the marketplace: token subset
//! selection, the atomic transaction engine, and startup reconciliation.

mod config;
mod selection;
mod service;

#[cfg(test)]
mod tests;

pub use config::ExchangeConfig;
pub use selection::{select_tokens, SelectionPolicy};
pub use service::{ExchangeService, ReconcileReport};
