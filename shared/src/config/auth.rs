//! Bearer-token identity configuration module
//!
//! Token issuing belongs to the external auth service; this backend only
//! verifies bearer tokens, so the configuration is limited to the shared
//! verification secret.

use serde::{Deserialize, Serialize};

/// Configuration for verifying caller identity
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::from("development-secret-change-me"),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "development-secret-change-me".to_string());
        Self { jwt_secret }
    }
}
