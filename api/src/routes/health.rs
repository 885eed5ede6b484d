//! Health check endpoint.

use actix_web::HttpResponse;
use chrono::Utc;
use mo_shared::types::HealthResponse;

/// GET /health
///
/// Unauthenticated liveness probe. Reports process health only; storage
/// reachability surfaces through the ledger endpoints' 5xx codes.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "momentous-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
