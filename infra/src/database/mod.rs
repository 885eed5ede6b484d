//! Database module - MySQL implementations using SQLx
//!
//! Provides the connection pool and the MySQL repository implementations
//! behind the core repository traits.

pub mod connection;
pub mod mysql;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{
    MySqlReputationEventRepository, MySqlServiceRepository, MySqlTokenRepository,
    MySqlTransactionRepository,
};
