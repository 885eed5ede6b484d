//! Business services of the time-token ledger.

pub mod exchange;
pub mod marketplace;
pub mod reputation;
pub mod token;
