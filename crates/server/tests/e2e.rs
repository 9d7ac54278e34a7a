use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use configs::AppConfig;

const KEY: &str = "e2e-key";

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).header("X-API-Key", KEY).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).header("X-API-Key", KEY).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }
}

/// Start the full stack against Postgres; `None` when no database is usable.
async fn start_server() -> Option<TestApp> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL missing; skip e2e tests");
        return None;
    };

    let mut cfg = AppConfig::default();
    cfg.database.url = url;
    cfg.database.min_connections = 1;
    cfg.database.connect_timeout_secs = 3;
    cfg.auth.api_keys = vec![KEY.to_string()];

    let app = match server::startup::build_app(cfg).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("skip e2e: {e}");
            return None;
        }
    };

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await.ok()?;
    let addr: SocketAddr = listener.local_addr().ok()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });

    Some(TestApp { base_url: format!("http://{addr}"), client: reqwest::Client::new() })
}

#[tokio::test]
async fn e2e_catalog_flow() {
    let Some(app) = start_server().await else { return };

    let res = app.client.get(app.url("/readyz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // names are unique per run so repeated runs against one database do not collide
    let tag = Uuid::new_v4().simple().to_string();
    let prefix = format!("e2e-{tag}");
    let mut ids = Vec::new();
    for suffix in ["c", "a", "b"] {
        let (status, body) = app
            .post("/v1/services", json!({ "name": format!("{prefix}-{suffix}"), "description": "e2e" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, _) = app.post("/v1/services", json!({ "name": format!("{prefix}-a") })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let first = &ids[0];
    for v in ["1.0.0", "1.1.0"] {
        let (status, _) = app.post(&format!("/v1/services/{first}/versions"), json!({ "version": v })).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = app.post(&format!("/v1/services/{first}/versions"), json!({ "version": "1.0.0" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(&format!("/v1/services/{}/versions", Uuid::new_v4()), json!({ "version": "1.0.0" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // search is case-insensitive and the page walk is stable
    let search = prefix.to_uppercase();
    let (_, page1) = app.get(&format!("/v1/services?q={search}&limit=2")).await;
    let (_, page2) = app.get(&format!("/v1/services?q={search}&limit=2&offset=2")).await;
    let names: Vec<String> = page1["items"]
        .as_array()
        .unwrap()
        .iter()
        .chain(page2["items"].as_array().unwrap())
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, [format!("{prefix}-a"), format!("{prefix}-b"), format!("{prefix}-c")]);

    let (_, hydrated) = app.get(&format!("/v1/services?q={prefix}-c&include_versions=true")).await;
    let versions = hydrated["items"][0]["versions"].as_array().unwrap();
    assert_eq!(versions[0]["version"], "1.1.0");
    assert_eq!(versions[1]["version"], "1.0.0");

    let (status, body) = app.get(&format!("/v1/services/{first}?include_versions=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["versions"].as_array().unwrap().len(), 2);

    let (status, _) = app.get(&format!("/v1/services/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn e2e_rejects_missing_key() {
    let Some(app) = start_server().await else { return };
    let res = app.client.get(app.url("/v1/services")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
