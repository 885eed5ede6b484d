//! Momentous API server entry point.
//!
//! Wires the MySQL repositories, optional Redis catalog cache, and the
//! reputation delivery backend into the exchange engine, then starts the
//! HTTP server. Backend choices (webhook vs. logging notifier, Redis vs.
//! no cache) are made once here from configuration; the rest of the stack
//! is generic over them.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use async_trait::async_trait;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use mo_api::app::create_app;
use mo_api::middleware::auth::JwtAuth;
use mo_api::state::AppState;
use mo_core::domain::entities::service::Service;
use mo_core::services::exchange::{ExchangeConfig, ExchangeService, SelectionPolicy};
use mo_core::services::marketplace::{CatalogCache, MarketplaceService, NoopCatalogCache};
use mo_core::services::reputation::{ReputationDispatcher, ReputationNotifier};
use mo_core::services::token::{ExpirySweeper, SweeperConfig, TokenService};
use mo_infra::cache::RedisCatalogCache;
use mo_infra::database::{
    DatabasePool, MySqlReputationEventRepository, MySqlServiceRepository, MySqlTokenRepository,
    MySqlTransactionRepository,
};
use mo_infra::reputation::{LoggingReputationNotifier, WebhookReputationNotifier};
use mo_shared::config::AppConfig;

/// Reputation delivery backend chosen at startup
enum Notifier {
    Webhook(WebhookReputationNotifier),
    Logging(LoggingReputationNotifier),
}

#[async_trait]
impl ReputationNotifier for Notifier {
    async fn notify_reputation(&self, user_id: Uuid, transaction_id: Uuid) -> Result<(), String> {
        match self {
            Notifier::Webhook(inner) => inner.notify_reputation(user_id, transaction_id).await,
            Notifier::Logging(inner) => inner.notify_reputation(user_id, transaction_id).await,
        }
    }
}

/// Catalog cache backend chosen at startup
enum CatalogCacheBackend {
    Redis(RedisCatalogCache),
    Noop(NoopCatalogCache),
}

#[async_trait]
impl CatalogCache for CatalogCacheBackend {
    async fn get(&self) -> Result<Option<Vec<Service>>, String> {
        match self {
            CatalogCacheBackend::Redis(inner) => inner.get().await,
            CatalogCacheBackend::Noop(inner) => inner.get().await,
        }
    }

    async fn put(&self, catalog: &[Service]) -> Result<(), String> {
        match self {
            CatalogCacheBackend::Redis(inner) => inner.put(catalog).await,
            CatalogCacheBackend::Noop(inner) => inner.put(catalog).await,
        }
    }

    async fn invalidate(&self) -> Result<(), String> {
        match self {
            CatalogCacheBackend::Redis(inner) => inner.invalidate().await,
            CatalogCacheBackend::Noop(inner) => inner.invalidate().await,
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    info!(environment = ?config.environment, "Starting Momentous API server");

    let pool = DatabasePool::new(config.database.clone())
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database setup failed: {}", e)))?;

    let tokens_repo = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
    let transactions_repo = Arc::new(MySqlTransactionRepository::new(pool.get_pool().clone()));
    let services_repo = Arc::new(MySqlServiceRepository::new(pool.get_pool().clone()));
    let events_repo = Arc::new(MySqlReputationEventRepository::new(pool.get_pool().clone()));

    // Reputation delivery: webhook when a profile-service URL is configured
    let notifier = match &config.ledger.reputation_webhook_url {
        Some(url) => {
            let webhook = WebhookReputationNotifier::new(url.clone()).map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("webhook setup failed: {}", e))
            })?;
            info!(url = %url, "Reputation notifications will be delivered via webhook");
            Notifier::Webhook(webhook)
        }
        None => {
            info!("No reputation webhook configured; notifications will be logged only");
            Notifier::Logging(LoggingReputationNotifier)
        }
    };

    let dispatcher = Arc::new(ReputationDispatcher::new(
        Arc::clone(&events_repo),
        Arc::new(notifier),
    ));
    Arc::clone(&dispatcher)
        .start_background_task(config.ledger.reputation_dispatch_interval_seconds);

    // Catalog cache: Redis when configured and reachable, otherwise disabled
    let cache = match &config.ledger.redis_url {
        Some(url) => {
            match RedisCatalogCache::new(url, config.ledger.catalog_cache_ttl_seconds).await {
                Ok(redis) => {
                    info!("Catalog cache enabled (Redis)");
                    CatalogCacheBackend::Redis(redis)
                }
                Err(e) => {
                    warn!("Redis unavailable, catalog cache disabled: {}", e);
                    CatalogCacheBackend::Noop(NoopCatalogCache)
                }
            }
        }
        None => CatalogCacheBackend::Noop(NoopCatalogCache),
    };

    let selection_policy = match config.ledger.selection_policy.parse::<SelectionPolicy>() {
        Ok(policy) => policy,
        Err(e) => {
            warn!("Invalid LEDGER_SELECTION_POLICY, using default: {}", e);
            SelectionPolicy::default()
        }
    };
    let exchange_config = ExchangeConfig::default()
        .with_storage_timeout(Duration::from_secs(config.ledger.storage_timeout_seconds))
        .with_selection_policy(selection_policy);

    let exchange = Arc::new(ExchangeService::new(
        Arc::clone(&tokens_repo),
        Arc::clone(&transactions_repo),
        Arc::clone(&services_repo),
        dispatcher,
        exchange_config,
    ));

    // Settle transactions interrupted by a previous crash before serving
    match exchange.reconcile_pending().await {
        Ok(report) => {
            if report.completed > 0 || report.failed > 0 {
                info!(
                    completed = report.completed,
                    failed = report.failed,
                    "Reconciled interrupted transactions"
                );
            }
        }
        Err(e) => error!("Startup reconciliation failed: {}", e),
    }

    let sweeper = Arc::new(ExpirySweeper::new(
        Arc::clone(&tokens_repo),
        SweeperConfig {
            interval_seconds: config.ledger.sweep_interval_seconds,
            enabled: config.ledger.sweeper_enabled,
        },
    ));
    sweeper.start_background_task();

    let state = web::Data::new(AppState {
        tokens: Arc::new(TokenService::new(Arc::clone(&tokens_repo))),
        exchange,
        marketplace: Arc::new(MarketplaceService::new(services_repo, Arc::new(cache))),
    });

    let bind_address = config.server.bind_address();
    let jwt_secret = config.auth.jwt_secret.clone();
    let workers = config.server.workers;

    info!(address = %bind_address, "HTTP server listening");

    let mut server = HttpServer::new(move || {
        create_app(state.clone(), JwtAuth::with_secret(jwt_secret.clone()))
    })
    .bind(&bind_address)?;

    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await
}
