//! CORS middleware configuration for cross-origin requests.
//!
//! Environment-aware: development allows any origin for easier testing,
//! production restricts origins to the configured list.
//!
//! # Environment Variables
//! - `ENVIRONMENT`: Set to "production" for production settings
//! - `ALLOWED_ORIGINS`: Comma-separated list of allowed origins (production only)
//! - `CORS_MAX_AGE`: Max age for preflight cache (default: 3600 seconds)

use actix_cors::Cors;
use actix_web::http::{header, Method};
use std::env;
use tracing::{info, warn};

/// Creates a CORS middleware instance configured for the current environment
pub fn create_cors() -> Cors {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let max_age = env::var("CORS_MAX_AGE")
        .unwrap_or_else(|_| "3600".to_string())
        .parse::<usize>()
        .unwrap_or(3600);

    if environment == "production" {
        create_production_cors(max_age)
    } else {
        create_development_cors(max_age)
    }
}

fn create_development_cors(max_age: usize) -> Cors {
    info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
        ])
        .max_age(max_age)
}

fn create_production_cors(max_age: usize) -> Cors {
    let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_default();
    if allowed_origins.is_empty() {
        warn!("ALLOWED_ORIGINS is empty; CORS will reject cross-origin requests");
    }

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
        ])
        .max_age(max_age);

    for origin in allowed_origins.split(',').filter(|o| !o.trim().is_empty()) {
        cors = cors.allowed_origin(origin.trim());
    }
    cors
}
