//! Token store services
//!
//! This module provides the minting and holdings surface of the Token
//! Store plus the background expiry sweeper.

mod service;
mod sweeper;

pub use service::TokenService;
pub use sweeper::{ExpirySweeper, SweepOutcome, SweeperConfig};
