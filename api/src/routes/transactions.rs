//! Exchange endpoints: purchases, history, and cancellation.

use actix_web::{web, HttpResponse};
use mo_core::repositories::{
    ReputationEventRepository, ServiceRepository, TokenRepository, TransactionRepository,
};
use mo_core::services::marketplace::CatalogCache;
use mo_core::services::reputation::ReputationNotifier;
use uuid::Uuid;

use crate::dto::{CreateTransactionRequest, RecentQuery};
use crate::handlers::domain_error_response;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

/// GET /api/transactions/recent
///
/// The caller's transaction history, newest first.
pub async fn recent_transactions<T, X, S, E, N, C>(
    auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
    query: web::Query<RecentQuery>,
) -> HttpResponse
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    match state
        .exchange
        .recent_for_user(auth.user_id, query.limit)
        .await
    {
        Ok(transactions) => HttpResponse::Ok().json(transactions),
        Err(e) => domain_error_response(&e),
    }
}

/// GET /api/transactions/{id}
///
/// A single transaction, visible to its parties only.
pub async fn get_transaction<T, X, S, E, N, C>(
    auth: AuthContext,
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
    match state
        .exchange
        .transaction_for_user(path.into_inner(), auth.user_id)
        .await
    {
        Ok(transaction) => HttpResponse::Ok().json(transaction),
        Err(e) => domain_error_response(&e),
    }
}

/// POST /api/transactions
///
/// Execute a purchase from the caller to the recipient. The transfer
/// settles before the response: the returned transaction is terminal.
pub async fn create_transaction<T, X, S, E, N, C>(
    auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
    body: web::Json<CreateTransactionRequest>,
) -> HttpResponse
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    let body = body.into_inner();
    match state
        .exchange
        .create(auth.user_id, body.recipient_id, body.service_id, body.token_ids)
        .await
    {
        Ok(transaction) => HttpResponse::Created().json(transaction),
        Err(e) => domain_error_response(&e),
    }
}

/// POST /api/transactions/{id}/cancel
///
/// Cancel a still-pending transaction. Sender only.
pub async fn cancel_transaction<T, X, S, E, N, C>(
    auth: AuthContext,
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
    match state
        .exchange
        .cancel(path.into_inner(), auth.user_id)
        .await
    {
        Ok(transaction) => HttpResponse::Ok().json(transaction),
        Err(e) => domain_error_response(&e),
    }
}
