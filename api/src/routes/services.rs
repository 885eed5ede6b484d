//! Marketplace endpoints: catalog discovery and provider listings.

use actix_web::{web, HttpResponse};
use mo_core::repositories::{
    ReputationEventRepository, ServiceRepository, TokenRepository, TransactionRepository,
};
use mo_core::services::marketplace::{CatalogCache, NewListing, ServiceFilter, ServiceSort};
use mo_core::services::reputation::ReputationNotifier;
use mo_shared::types::ErrorResponse;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateServiceRequest, ServiceQuery};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

/// GET /api/services
///
/// Filtered, sorted catalog. An unrecognized `sort` value is a 400 rather
/// than a silent fallback to the default order.
pub async fn list_services<T, X, S, E, N, C>(
    _auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
    query: web::Query<ServiceQuery>,
) -> HttpResponse
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    let query = query.into_inner();
    let sort = match query.sort.as_deref() {
        Some(raw) => match raw.parse::<ServiceSort>() {
            Ok(sort) => sort,
            Err(message) => {
                return HttpResponse::BadRequest()
                    .json(ErrorResponse::new("VALIDATION_ERROR", message));
            }
        },
        None => ServiceSort::default(),
    };

    let filter = ServiceFilter {
        category: query.category,
        text: query.text,
        min_cost: query.min_cost,
        max_cost: query.max_cost,
        sort,
    };

    match state.marketplace.search(&filter).await {
        Ok(services) => HttpResponse::Ok().json(services),
        Err(e) => domain_error_response(&e),
    }
}

/// GET /api/services/{id}
pub async fn get_service<T, X, S, E, N, C>(
    _auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
    path: web::Path<Uuid>,
) -> HttpResponse
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    match state.marketplace.get(path.into_inner()).await {
        Ok(service) => HttpResponse::Ok().json(service),
        Err(e) => domain_error_response(&e),
    }
}

/// POST /api/services
///
/// Create a listing offered by the caller.
pub async fn create_service<T, X, S, E, N, C>(
    auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
    body: web::Json<CreateServiceRequest>,
) -> HttpResponse
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }

    let body = body.into_inner();
    let listing = NewListing {
        title: body.title,
        description: body.description,
        time_cost: body.time_cost,
        categories: body.categories,
    };

    match state.marketplace.create_listing(auth.user_id, listing).await {
        Ok(service) => HttpResponse::Created().json(service),
        Err(e) => domain_error_response(&e),
    }
}
