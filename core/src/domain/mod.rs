//! Domain layer: entities of the time-token ledger.

pub mod entities;

pub use entities::*;
