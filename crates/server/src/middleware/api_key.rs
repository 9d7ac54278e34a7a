use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Probe and scrape endpoints that never need a key.
const EXEMPT_PATHS: [&str; 3] = ["/healthz", "/readyz", "/metrics"];

/// Middleware: require a configured `X-API-Key` on everything but the probes.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if EXEMPT_PATHS.contains(&path) {
        return next.run(req).await;
    }

    let key = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");
    if key.is_empty() {
        warn!(%path, "missing api key");
        return JsonApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Missing API key").into_response();
    }
    if !state.api_keys.contains(key) {
        warn!(%path, "invalid api key");
        return JsonApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid API key").into_response();
    }
    next.run(req).await
}
