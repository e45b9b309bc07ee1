//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `reports`: Lost and found report management
//! - `matching`: Match listings for single reports, the caller, and globally

pub mod health;
pub mod matching;
pub mod reports;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "FindItBack Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/lost",
            "/api/v1/found",
            "/api/v1/matches",
            "/api/v1/matches/lost/{id}",
            "/api/v1/matches/found/{id}",
            "/api/v1/matches/my/lost",
            "/api/v1/matches/my/found",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
