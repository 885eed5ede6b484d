//! Cache module for Redis-based caching
//!
//! Holds the catalog snapshot cache used by the marketplace query engine.

pub mod catalog_cache;

pub use catalog_cache::RedisCatalogCache;
