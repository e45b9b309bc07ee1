use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::telemetry;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;
use store::ReportFilter;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "finditback-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Ready once the report store answers a query.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let open_lost = state.store.find_lost(&ReportFilter::active()).await?.len();
    let open_found = state.store.find_found(&ReportFilter::active()).await?.len();

    Ok(Json(json!({
        "status": "ready",
        "service": "finditback-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": "ready",
            "matcher": "ready",
        },
        "activeLostItems": open_lost,
        "activeFoundItems": open_found,
    })))
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    if !state.config.metrics_enabled {
        return Err(ServerError::NotFound);
    }

    let mut body = telemetry::render().unwrap_or_default();
    body.push_str(&format!(
        "# TYPE finditback_uptime_seconds gauge\nfinditback_uptime_seconds {}\n",
        uptime_seconds()
    ));

    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
