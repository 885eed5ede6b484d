//! Shared application state.

use std::sync::Arc;

use mo_core::repositories::{
    ReputationEventRepository, ServiceRepository, TokenRepository, TransactionRepository,
};
use mo_core::services::exchange::ExchangeService;
use mo_core::services::marketplace::{CatalogCache, MarketplaceService};
use mo_core::services::reputation::ReputationNotifier;
use mo_core::services::token::TokenService;

/// Application state holding the shared services
///
/// Generic over the repository, notifier, and cache implementations so the
/// same handlers run against MySQL in production and the in-memory mocks in
/// tests.
pub struct AppState<T, X, S, E, N, C>
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    pub tokens: Arc<TokenService<T>>,
    pub exchange: Arc<ExchangeService<T, X, S, E, N>>,
    pub marketplace: Arc<MarketplaceService<S, C>>,
}
