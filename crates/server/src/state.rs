use std::collections::HashSet;
use std::sync::Arc;

use configs::AppConfig;
use service::catalog::repository::CatalogRepository;
use service::catalog::{CatalogService, CatalogSettings};

use crate::metrics::Metrics;

pub type Catalog = CatalogService<dyn CatalogRepository>;

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<AppConfig>,
    pub metrics: Arc<Metrics>,
    pub api_keys: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn CatalogRepository>, config: AppConfig) -> Result<Self, prometheus::Error> {
        let settings = CatalogSettings::from(&config.catalog);
        let api_keys = config.auth.api_keys.iter().cloned().collect();
        Ok(Self {
            catalog: Arc::new(CatalogService::new(repo, settings)),
            config: Arc::new(config),
            metrics: Arc::new(Metrics::new()?),
            api_keys: Arc::new(api_keys),
        })
    }
}
