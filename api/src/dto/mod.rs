//! Request and query DTOs for the HTTP surface.
//!
//! Shape validation happens here with `validator`; business rules (15-minute
//! denominations, sufficiency, ownership) stay in the core services, which
//! re-check everything regardless of what the DTO allowed through.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request body for POST /api/tokens
#[derive(Debug, Deserialize, Validate)]
pub struct MintTokenRequest {
    /// Face value in minutes; the ledger enforces the multiple-of-15 rule
    #[validate(range(min = 1, message = "denomination must be positive"))]
    pub denomination: i32,

    /// Optional expiry; must lie in the future
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for POST /api/services
#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 4000, message = "description is too long"))]
    #[serde(default)]
    pub description: String,

    #[validate(range(min = 1, message = "time_cost must be positive"))]
    pub time_cost: i32,

    #[validate(length(min = 1, message = "at least one category is required"))]
    pub categories: Vec<String>,
}

/// Query parameters for GET /api/services
#[derive(Debug, Default, Deserialize)]
pub struct ServiceQuery {
    pub category: Option<String>,
    pub text: Option<String>,
    pub min_cost: Option<i32>,
    pub max_cost: Option<i32>,
    /// One of: newest, oldest, cost_asc, cost_desc, rating_desc
    pub sort: Option<String>,
}

/// Request body for POST /api/transactions
///
/// `token_ids` switches between caller-chosen payment and engine-side
/// selection; selection requires `service_id` to know the amount.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub recipient_id: Uuid,

    pub service_id: Option<Uuid>,

    pub token_ids: Option<Vec<Uuid>>,
}

/// Query parameters for GET /api/transactions/recent
#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}
