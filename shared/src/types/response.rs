//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standardized error response structure for domain errors
///
/// The `error` field carries a stable SCREAMING_SNAKE code the clients
/// branch on; `message` is human-readable and free to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp of when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response with additional details
    pub fn with_details(mut self, details: HashMap<String, serde_json::Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// Add a single detail to the error response
    pub fn with_detail(mut self, key: impl ToString, value: serde_json::Value) -> Self {
        let mut details = self.details.unwrap_or_default();
        details.insert(key.to_string(), value);
        self.details = Some(details);
        self
    }
}

/// Health check response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: String,

    /// Service name
    pub service: String,

    /// Server version
    pub version: String,

    /// Server timestamp
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new("INSUFFICIENT_FUNDS", "Not enough active tokens");
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("INSUFFICIENT_FUNDS"));
        // details are omitted when absent
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_error_response_with_detail() {
        let response = ErrorResponse::new("INSUFFICIENT_FUNDS", "Not enough active tokens")
            .with_detail("required", serde_json::json!(45));

        assert_eq!(response.details.unwrap()["required"], 45);
    }
}
