//! # API Layer
//!
//! HTTP surface for the Momentous backend: route handlers, request DTOs,
//! the bearer-token middleware, and the domain-error to status-code
//! mapping. All business rules live in `mo_core`; handlers validate
//! shapes, delegate, and translate errors.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
