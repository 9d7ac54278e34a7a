use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::context::RequestContext;
use super::domain::{NewService, NewServiceVersion, Service, ServiceVersion};
use super::query::{EffectiveListParams, ListServicesParams};
use super::repository::CatalogRepository;
use crate::errors::ServiceError;

/// Engine settings derived from `[catalog]`.
#[derive(Clone, Debug)]
pub struct CatalogSettings {
    pub max_page_size: u64,
    pub query_timeout: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { max_page_size: 100, query_timeout: Duration::from_millis(5000) }
    }
}

impl From<&configs::CatalogConfig> for CatalogSettings {
    fn from(cfg: &configs::CatalogConfig) -> Self {
        Self { max_page_size: cfg.max_page_size, query_timeout: Duration::from_millis(cfg.query_timeout_ms) }
    }
}

/// Catalog business service independent of web framework.
///
/// Every repository call is bounded by `query_timeout`. Nothing is retried.
pub struct CatalogService<R: CatalogRepository + ?Sized> {
    repo: Arc<R>,
    settings: CatalogSettings,
}

impl<R: CatalogRepository + ?Sized> CatalogService<R> {
    pub fn new(repo: Arc<R>, settings: CatalogSettings) -> Self { Self { repo, settings } }

    pub fn settings(&self) -> &CatalogSettings { &self.settings }

    async fn bounded<T>(&self, op: &'static str, fut: impl Future<Output = Result<T, ServiceError>>) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.settings.query_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(ServiceError::Timeout(format!("{op} exceeded {}ms", self.settings.query_timeout.as_millis()))),
        }
    }

    /// List one page of services after fallback and clamping.
    ///
    /// # Examples
    /// ```
    /// use service::catalog::{CatalogService, CatalogSettings, RequestContext};
    /// use service::catalog::query::ListServicesParams;
    /// use service::catalog::repository::mock::InMemoryCatalogRepository;
    /// use std::sync::Arc;
    /// let svc = CatalogService::new(Arc::new(InMemoryCatalogRepository::new()), CatalogSettings::default());
    /// let page = tokio_test::block_on(svc.list_services(&RequestContext::detached(), ListServicesParams::new().limit(10))).unwrap();
    /// assert!(page.is_empty());
    /// ```
    pub async fn list_services(&self, ctx: &RequestContext, params: ListServicesParams) -> Result<Vec<Service>, ServiceError> {
        let effective = params.normalize(self.settings.max_page_size);
        self.list_effective(ctx, &effective).await
    }

    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id, sort = %p.sort, order = %p.order, limit = p.limit, offset = p.offset, include_versions = p.include_versions))]
    async fn list_effective(&self, ctx: &RequestContext, p: &EffectiveListParams) -> Result<Vec<Service>, ServiceError> {
        self.bounded("list_services", self.repo.list_services(p)).await
    }

    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn get_service(&self, ctx: &RequestContext, id: Uuid, include_versions: bool) -> Result<Option<Service>, ServiceError> {
        self.bounded("get_service", self.repo.get_service(id, include_versions)).await
    }

    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list_versions(&self, ctx: &RequestContext, service_id: Uuid) -> Result<Vec<ServiceVersion>, ServiceError> {
        self.bounded("list_versions", self.repo.list_versions(service_id)).await
    }

    /// Create a service. A `Timeout` here means the insert may or may not
    /// have been applied; a later `DuplicateName` confirms it was.
    #[instrument(skip(self, ctx, input), fields(request_id = %ctx.request_id, name = %input.name))]
    pub async fn create_service(&self, ctx: &RequestContext, input: NewService) -> Result<Service, ServiceError> {
        match self.bounded("create_service", self.repo.create_service(input)).await {
            Ok(created) => {
                info!(service_id = %created.id, name = %created.name, "service_created");
                Ok(created)
            }
            Err(e @ ServiceError::Timeout(_)) => {
                warn!(error = %e, "create_service timed out; outcome unknown");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Same outcome caveat as [`Self::create_service`] on `Timeout`.
    #[instrument(skip(self, ctx, input), fields(request_id = %ctx.request_id, service_id = %input.service_id, version = %input.version))]
    pub async fn create_service_version(&self, ctx: &RequestContext, input: NewServiceVersion) -> Result<ServiceVersion, ServiceError> {
        match self.bounded("create_service_version", self.repo.create_service_version(input)).await {
            Ok(created) => {
                info!(version_id = %created.id, service_id = %created.service_id, version = %created.version, "service_version_created");
                Ok(created)
            }
            Err(e @ ServiceError::Timeout(_)) => {
                warn!(error = %e, "create_service_version timed out; outcome unknown");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn ping(&self, limit: Duration) -> Result<(), ServiceError> {
        match tokio::time::timeout(limit, self.repo.ping()).await {
            Ok(res) => res,
            Err(_) => Err(ServiceError::Timeout("ping".into())),
        }
    }
}
