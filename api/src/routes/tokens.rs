//! Token endpoints: minting and holdings.

use actix_web::{web, HttpResponse};
use mo_core::repositories::{
    ReputationEventRepository, ServiceRepository, TokenRepository, TransactionRepository,
};
use mo_core::services::marketplace::CatalogCache;
use mo_core::services::reputation::ReputationNotifier;
use validator::Validate;

use crate::dto::MintTokenRequest;
use crate::handlers::{domain_error_response, validation_error_response};
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

/// GET /api/tokens/my
///
/// The caller's active, unexpired tokens in selection order.
pub async fn my_tokens<T, X, S, E, N, C>(
    auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
) -> HttpResponse
where
    T: TokenRepository,
    X: TransactionRepository,
    S: ServiceRepository,
    E: ReputationEventRepository,
    N: ReputationNotifier,
    C: CatalogCache,
{
    match state.tokens.active_tokens(auth.user_id).await {
        Ok(tokens) => HttpResponse::Ok().json(tokens),
        Err(e) => domain_error_response(&e),
    }
}

/// POST /api/tokens
///
/// Mint a token owned by the caller.
pub async fn mint_token<T, X, S, E, N, C>(
    auth: AuthContext,
    state: web::Data<AppState<T, X, S, E, N, C>>,
    body: web::Json<MintTokenRequest>,
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

    match state
        .tokens
        .mint(auth.user_id, body.denomination, body.expires_at)
        .await
    {
        Ok(token) => HttpResponse::Created().json(token),
        Err(e) => domain_error_response(&e),
    }
}
