//! Marketplace query engine module
//!
//! Catalog discovery: pure filtering/sorting over a service snapshot,
//! with an optional read-through cache in front of the repository.

mod cache;
mod filter;
mod service;

pub use cache::{CatalogCache, NoopCatalogCache};
pub use filter::{apply_filter, ServiceFilter, ServiceSort};
pub use service::{MarketplaceService, NewListing};
