use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::{Health, Readiness};
use tracing::warn;

use crate::state::AppState;

const READINESS_PROBE_LIMIT: Duration = Duration::from_secs(1);

/// Liveness: the process is up
#[utoipa::path(get, path = "/healthz", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn healthz() -> Json<Health> {
    Json(Health::ok())
}

/// Readiness: the store answers a ping within one second
#[utoipa::path(
    get,
    path = "/readyz",
    tag = "health",
    responses((status = 200, description = "Ready"), (status = 503, description = "Store unreachable"))
)]
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    match state.catalog.ping(READINESS_PROBE_LIMIT).await {
        Ok(()) => (StatusCode::OK, Json(Readiness::ready())),
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Readiness::unavailable(e.kind())))
        }
    }
}

/// Prometheus scrape endpoint
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(e) => {
            warn!(error = %e, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
