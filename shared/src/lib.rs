//! # Momentous Shared
//!
//! Shared configuration and common API types used across the Momentous
//! backend crates. This crate has no business logic; it only holds the
//! plumbing every layer agrees on.

pub mod config;
pub mod types;
