//! Application factory
//!
//! Builds the Actix-web application from shared state. Generic over the
//! repository, notifier, and cache implementations so the integration
//! tests can assemble the same app over in-memory stores.

use actix_web::{web, App, HttpResponse};
use mo_core::repositories::{
    ReputationEventRepository, ServiceRepository, TokenRepository, TransactionRepository,
};
use mo_core::services::marketplace::CatalogCache;
use mo_core::services::reputation::ReputationNotifier;
use mo_shared::types::ErrorResponse;
use tracing_actix_web::TracingLogger;

use crate::middleware::{auth::JwtAuth, cors::create_cors};
use crate::routes::{health, services, tokens, transactions};
use crate::state::AppState;

/// Create and configure the application with all routes and middleware
pub fn create_app<T, X, S, E, N, C>(
    app_state: web::Data<AppState<T, X, S, E, N, C>>,
    jwt_auth: JwtAuth,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        // CORS wraps the body in EitherBody and TracingLogger in StreamSpan
        Response = actix_web::dev::ServiceResponse<
            actix_web::body::EitherBody<tracing_actix_web::StreamSpan<actix_web::body::BoxBody>>,
        >,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    T: TokenRepository + 'static,
    X: TransactionRepository + 'static,
    S: ServiceRepository + 'static,
    E: ReputationEventRepository + 'static,
    N: ReputationNotifier + 'static,
    C: CatalogCache + 'static,
{
    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .wrap(TracingLogger::default())
        .wrap(cors)
        // Liveness probe stays outside the authenticated scope
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .wrap(jwt_auth)
                .route("/tokens/my", web::get().to(tokens::my_tokens::<T, X, S, E, N, C>))
                .route("/tokens", web::post().to(tokens::mint_token::<T, X, S, E, N, C>))
                .route(
                    "/services",
                    web::get().to(services::list_services::<T, X, S, E, N, C>),
                )
                .route(
                    "/services",
                    web::post().to(services::create_service::<T, X, S, E, N, C>),
                )
                .route(
                    "/services/{id}",
                    web::get().to(services::get_service::<T, X, S, E, N, C>),
                )
                .route(
                    "/transactions/recent",
                    web::get().to(transactions::recent_transactions::<T, X, S, E, N, C>),
                )
                .route(
                    "/transactions",
                    web::post().to(transactions::create_transaction::<T, X, S, E, N, C>),
                )
                .route(
                    "/transactions/{id}",
                    web::get().to(transactions::get_transaction::<T, X, S, E, N, C>),
                )
                .route(
                    "/transactions/{id}/cancel",
                    web::post().to(transactions::cancel_transaction::<T, X, S, E, N, C>),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "NOT_FOUND",
        "The requested resource does not exist",
    ))
}
