//! HTTP route handlers

pub mod health;
pub mod services;
pub mod tokens;
pub mod transactions;
