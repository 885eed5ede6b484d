//! Mapping from domain errors to HTTP responses.
//!
//! Every response body is an `ErrorResponse` whose `error` field carries the
//! stable code clients branch on. The status is derived from the error class:
//! shape problems are 4xx, sufficiency problems are 422, storage problems
//! are 5xx.

use actix_web::{http::StatusCode, HttpResponse};
use mo_core::errors::{DomainError, LedgerError};
use mo_shared::types::ErrorResponse;
use validator::ValidationErrors;

/// HTTP status for a domain error
fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Unauthorized => StatusCode::FORBIDDEN,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Ledger(ledger) => match ledger {
            LedgerError::InvalidDenomination { .. } => StatusCode::BAD_REQUEST,
            LedgerError::InsufficientFunds { .. } | LedgerError::InsufficientPayment { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            LedgerError::OwnershipMismatch { .. } => StatusCode::FORBIDDEN,
            LedgerError::TokenInactive { .. }
            | LedgerError::DuplicateToken { .. }
            | LedgerError::AlreadyProcessing { .. } => StatusCode::CONFLICT,
            LedgerError::StorageTimeout => StatusCode::GATEWAY_TIMEOUT,
            LedgerError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        },
    }
}

/// Build the HTTP response for a domain error
pub fn domain_error_response(error: &DomainError) -> HttpResponse {
    let status = status_for(error);
    let body = ErrorResponse::new(error.code(), error.to_string());
    HttpResponse::build(status).json(body)
}

/// Build a 400 response for request-shape validation failures
///
/// Field errors land in `details` keyed by field name so clients can
/// highlight the offending inputs.
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut body = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed");
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        body = body.with_detail(field, serde_json::json!(messages));
    }
    HttpResponse::BadRequest().json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_maps_to_400() {
        let error = DomainError::Validation {
            message: "bad input".to_string(),
        };
        assert_eq!(status_for(&error), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error = DomainError::NotFound {
            resource: "token".to_string(),
        };
        assert_eq!(status_for(&error), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_ownership_errors_map_to_403() {
        assert_eq!(status_for(&DomainError::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::OwnershipMismatch {
                token_id: Uuid::new_v4()
            })),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_sufficiency_errors_map_to_422() {
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::InsufficientFunds {
                available: 15,
                required: 60
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::InsufficientPayment {
                offered: 30,
                required: 45
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_state_conflicts_map_to_409() {
        let token_id = Uuid::new_v4();
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::TokenInactive { token_id })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::DuplicateToken { token_id })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::AlreadyProcessing {
                transaction_id: Uuid::new_v4()
            })),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_errors_map_to_5xx() {
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::StorageTimeout)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&DomainError::Ledger(LedgerError::StorageUnavailable {
                message: "pool closed".to_string()
            })),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&DomainError::Internal {
                message: "oops".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_carries_stable_code() {
        let error = DomainError::Ledger(LedgerError::InvalidDenomination { denomination: 10 });
        let response = domain_error_response(&error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
