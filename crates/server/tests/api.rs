use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use configs::AppConfig;
use server::routes::build_router;
use server::state::AppState;
use service::catalog::repository::mock::InMemoryCatalogRepository;

const KEY: &str = "test-key";

fn app_with(cfg: AppConfig) -> Router {
    let state = AppState::new(Arc::new(InMemoryCatalogRepository::new()), cfg).unwrap();
    build_router(state, CorsLayer::very_permissive())
}

fn app() -> Router {
    let mut cfg = AppConfig::default();
    cfg.auth.api_keys = vec![KEY.to_string()];
    app_with(cfg)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).header("X-API-Key", KEY).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-API-Key", KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

async fn create_service(app: &Router, name: &str) -> Value {
    let (status, body) = send(app, post("/v1/services", json!({ "name": name, "description": "" }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn names(body: &Value) -> Vec<String> {
    body["items"].as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap().to_string()).collect()
}

#[tokio::test]
async fn health_is_open_and_ready_pings_store() {
    let app = app();
    let res = app.clone().oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let (status, body) = send(&app, Request::builder().uri("/readyz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn api_key_is_required() {
    let app = app();
    let (status, body) = send(&app, Request::builder().uri("/v1/services").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing API key");

    let req = Request::builder().uri("/v1/services").header("X-API-Key", "wrong").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid API key");
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = app();
    let req = Request::builder().uri("/healthz").header("X-Request-ID", "req-42").body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-42");

    let res = app.oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap()).await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn create_then_read_back() {
    let app = app();
    let created = create_service(&app, "api-service").await;
    assert_eq!(created["name"], "api-service");
    assert_eq!(created["created_at"], created["updated_at"]);
    assert!(created.get("versions").is_none());

    let id = created["id"].as_str().unwrap();
    let (status, body) = send(&app, get(&format!("/v1/services/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn caller_supplied_id_is_ignored() {
    let app = app();
    let forced = "11111111-1111-4111-8111-111111111111";
    let (status, body) = send(&app, post("/v1/services", json!({ "id": forced, "name": "svc" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["id"], forced);
}

#[tokio::test]
async fn duplicate_name_is_conflict() {
    let app = app();
    create_service(&app, "billing").await;
    let (status, body) = send(&app, post("/v1/services", json!({ "name": "billing" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_name");
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let app = app();
    let (status, body) = send(&app, post("/v1/services", json!({ "description": "no name" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "name");

    let req = Request::builder()
        .method("POST")
        .uri("/v1/services")
        .header("X-API-Key", KEY)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"name":"x"}"#))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "Content-Type");

    let req = Request::builder()
        .method("POST")
        .uri("/v1/services")
        .header("X-API-Key", KEY)
        .body(Body::from("{broken"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Invalid JSON format");
}

#[tokio::test]
async fn strict_query_validation_happens_before_the_engine() {
    let app = app();
    for uri in [
        "/v1/services?sort=bogus",
        "/v1/services?order=sideways",
        "/v1/services?limit=0",
        "/v1/services?limit=1001",
        "/v1/services?offset=-3",
        "/v1/services?include_versions=yes",
        "/v1/services?limit=abc",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Validation failed", "{uri}");
    }
}

#[tokio::test]
async fn malformed_and_non_v4_ids_are_rejected() {
    let app = app();
    let (status, body) = send(&app, get("/v1/services/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "id");

    let (status, _) = send(&app, get("/v1/services/6ba7b810-9dad-11d1-80b4-00c04fd430c8/versions")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn absent_service_is_not_found_and_versions_are_empty() {
    let app = app();
    let id = Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/v1/services/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not_found", "message": "Service not found" }));

    let (status, body) = send(&app, get(&format!("/v1/services/{id}/versions"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "versions": [] }));
}

#[tokio::test]
async fn versions_lifecycle() {
    let app = app();
    let svc = create_service(&app, "versioned").await;
    let id = svc["id"].as_str().unwrap();
    for v in ["1.0.0", "1.1.0", "2.0.0"] {
        let (status, body) = send(&app, post(&format!("/v1/services/{id}/versions"), json!({ "version": v }))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["service_id"], id);
    }

    let (status, body) = send(&app, post(&format!("/v1/services/{id}/versions"), json!({ "version": "1.0.0" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_version");

    let (_, body) = send(&app, get(&format!("/v1/services/{id}/versions"))).await;
    let labels: Vec<_> = body["versions"].as_array().unwrap().iter().map(|v| v["version"].clone()).collect();
    assert_eq!(labels, [json!("2.0.0"), json!("1.1.0"), json!("1.0.0")]);

    let (_, body) = send(&app, get(&format!("/v1/services/{id}?include_versions=true"))).await;
    assert_eq!(body["versions"][0]["version"], "2.0.0");

    let (_, body) = send(&app, get("/v1/services")).await;
    assert!(body["items"][0].get("versions").is_none());
    let (_, body) = send(&app, get("/v1/services?include_versions=true")).await;
    assert_eq!(body["items"][0]["versions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn version_for_unknown_service_is_not_found() {
    let app = app();
    let id = Uuid::new_v4();
    let (status, body) = send(&app, post(&format!("/v1/services/{id}/versions"), json!({ "version": "1.0.0" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service not found");
}

#[tokio::test]
async fn search_sort_and_pages() {
    let mut cfg = AppConfig::default();
    cfg.auth.api_keys = vec![KEY.to_string()];
    cfg.catalog.max_page_size = 2;
    let app = app_with(cfg);
    for n in ["database-service", "api-service", "auth-service"] {
        create_service(&app, n).await;
    }

    let (_, body) = send(&app, get("/v1/services?q=AUTH")).await;
    assert_eq!(names(&body), ["auth-service"]);

    // limit above the configured page size is clamped
    let (_, body) = send(&app, get("/v1/services?limit=500")).await;
    assert_eq!(names(&body), ["api-service", "auth-service"]);
    let (_, body) = send(&app, get("/v1/services?limit=2&offset=2")).await;
    assert_eq!(names(&body), ["database-service"]);

    let (_, body) = send(&app, get("/v1/services?sort=name&order=desc&limit=1")).await;
    assert_eq!(names(&body), ["database-service"]);
}

#[tokio::test]
async fn offset_past_the_end_is_an_empty_page() {
    let app = app();
    create_service(&app, "only").await;
    for offset in [u64::MAX.to_string(), (i64::MAX as u64 + 1).to_string(), "1".to_string()] {
        let (status, body) = send(&app, get(&format!("/v1/services?offset={offset}"))).await;
        assert_eq!(status, StatusCode::OK, "{offset}");
        assert_eq!(body, json!({ "items": [] }), "{offset}");
    }
}

#[tokio::test]
async fn metrics_and_openapi_are_served() {
    let app = app();
    send(&app, get("/v1/services")).await;
    let res = app.clone().oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("catalog_http_requests_total"), "{text}");

    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/services"].is_object());
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let app = app();
    let (status, body) = send(&app, get("/v2/nothing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
