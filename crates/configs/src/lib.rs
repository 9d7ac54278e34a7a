use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    /// Validate pooled connections before handing them out.
    #[serde(default = "default_true")]
    pub test_before_acquire: bool,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            test_before_acquire: true,
            sqlx_logging: false,
        }
    }
}

/// Query engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Deadline applied to every store operation.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { max_page_size: default_max_page_size(), query_timeout_ms: default_query_timeout_ms() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_keys: Vec<String>,
}

fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 10 }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_max_page_size() -> u64 { 100 }
fn default_query_timeout_ms() -> u64 { 5000 }
fn default_true() -> bool { true }

/// Resolve the config file path: `CONFIG_PATH` wins, then `ENV` selects
/// between the local and default profiles.
pub fn default_path() -> String {
    if let Ok(p) = std::env::var("CONFIG_PATH") {
        return p;
    }
    match std::env::var("ENV").as_deref() {
        Ok("local") | Ok("development") => "config/local.toml".to_string(),
        _ => "config/default.toml".to_string(),
    }
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&default_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config file {path}: {e}"))?;
    let cfg: AppConfig = toml::from_str(&content)?;
    info!(%path, "config file parsed");
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        // A missing file is fine as long as the environment supplies the rest.
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) => {
                info!(error = %e, "no config file, using defaults and environment");
                AppConfig::default()
            }
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        cfg.log_summary();
        Ok(cfg)
    }

    /// Environment values take precedence over file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|v| v.trim().parse().ok())
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            self.database.url = url;
        }
        if let Some(host) = lookup("SERVER_HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = parsed(lookup("SERVER_PORT")) { self.server.port = port; }
        if let Some(v) = parsed(lookup("MAX_PAGE_SIZE")) { self.catalog.max_page_size = v; }
        if let Some(v) = parsed(lookup("DB_MAX_CONNECTIONS")) { self.database.max_connections = v; }
        if let Some(v) = parsed(lookup("DB_MIN_CONNECTIONS")) { self.database.min_connections = v; }
        if let Some(v) = parsed(lookup("DB_CONNECT_TIMEOUT_SECS")) { self.database.connect_timeout_secs = v; }
        if let Some(v) = parsed(lookup("DB_IDLE_TIMEOUT_SECS")) { self.database.idle_timeout_secs = v; }
        if let Some(v) = parsed(lookup("DB_MAX_LIFETIME_SECS")) { self.database.max_lifetime_secs = v; }
        if let Some(keys) = lookup("VALID_API_KEYS") {
            self.auth.api_keys = keys
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.validate()?;
        self.catalog.validate()?;
        Ok(())
    }

    fn log_summary(&self) {
        info!(
            addr = %format!("{}:{}", self.server.host, self.server.port),
            database_url = %redact_url(&self.database.url),
            max_page_size = self.catalog.max_page_size,
            query_timeout_ms = self.catalog.query_timeout_ms,
            db_max_connections = self.database.max_connections,
            db_min_connections = self.database.min_connections,
            api_keys = self.auth.api_keys.len(),
            "final configuration loaded"
        );
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("server.request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in the config file or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl CatalogConfig {
    fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(anyhow!("catalog.max_page_size must be >= 1"));
        }
        if self.query_timeout_ms == 0 {
            return Err(anyhow!("catalog.query_timeout_ms must be positive"));
        }
        Ok(())
    }
}

/// Replace the password component of a connection URL for logging.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else { return url.to_string() };
    let Some((creds, host)) = rest.rsplit_once('@') else { return url.to_string() };
    match creds.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
