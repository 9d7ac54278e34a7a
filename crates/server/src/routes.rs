pub mod health;
pub mod services;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::errors::JsonApiError;
use crate::middleware::{require_api_key, REQUEST_ID_HEADER};
use crate::state::AppState;
use crate::{metrics, openapi};

async fn route_not_found() -> JsonApiError {
    JsonApiError::new(StatusCode::NOT_FOUND, "not_found", "Route not found")
}

/// Build the full application router.
///
/// Layers, outermost first: request id, trace span, request timeout, API
/// key, metrics.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api = Router::new()
        .route("/v1/services", get(services::list_services).post(services::create_service))
        .route("/v1/services/:id", get(services::get_service))
        .route(
            "/v1/services/:id/versions",
            get(services::list_versions).post(services::create_service_version),
        );

    let ops = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    let edge = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors);

    api.merge(ops)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), metrics::track))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(edge)
        .with_state(state)
}
