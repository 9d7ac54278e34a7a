use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use service::catalog::repo::SeaOrmCatalogRepository;
use service::catalog::repository::CatalogRepository;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad listen address: {e}")))
}

/// Connect the pool, bring the schema up to date and build the router.
pub async fn build_app(cfg: AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
    info!(service = "server", event = "migrated", "schema is up to date");

    let repo: Arc<dyn CatalogRepository> = Arc::new(SeaOrmCatalogRepository::new(db));
    let state = AppState::new(repo, cfg).map_err(|e| StartupError::Any(e.into()))?;
    Ok(routes::build_router(state, build_cors()))
}

/// Serve until `shutdown` resolves, then give in-flight requests
/// `grace` to finish.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F, grace: Duration) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.changed().await;
    });
    let mut task = tokio::spawn(async move { server.await });

    tokio::select! {
        res = &mut task => return Ok(res??),
        _ = shutdown => {
            info!(service = "server", event = "shutdown_signal", "draining connections");
        }
    }
    let _ = stop_tx.send(true);

    match tokio::time::timeout(grace, &mut task).await {
        Ok(res) => {
            res??;
            info!(service = "server", event = "stop", "server stopped gracefully");
        }
        Err(_) => {
            warn!(service = "server", event = "shutdown_timeout", grace_secs = grace.as_secs(), "forcing shutdown");
            task.abort();
        }
    }
    Ok(())
}

/// Public entry: build the app from configuration and run the HTTP server.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = bind_addr(&cfg)?;
    let grace = Duration::from_secs(cfg.server.shutdown_timeout_secs);
    let app = build_app(cfg).await.map_err(|e| {
        error!(service = "server", event = "startup_failed", error = %e, "startup failed");
        e
    })?;

    let listener = TcpListener::bind(addr).await?;
    info!(service = "server", event = "listening", %addr, "catalog server listening");
    serve(listener, app, shutdown, grace).await
}
