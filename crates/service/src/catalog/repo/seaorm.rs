use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::domain::{NewService, NewServiceVersion, Service, ServiceVersion};
use crate::catalog::hydration::{attach_versions, service_ids};
use crate::catalog::query::{
    list_services_query, versions_for_services_query, versions_of_service_query, EffectiveListParams,
};
use crate::catalog::repository::CatalogRepository;
use crate::errors::ServiceError;

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list_services(&self, params: &EffectiveListParams) -> Result<Vec<Service>, ServiceError> {
        let page: Vec<Service> = list_services_query(params)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Service::from)
            .collect();
        if !params.include_versions || page.is_empty() {
            return Ok(page);
        }
        let versions: Vec<ServiceVersion> = versions_for_services_query(service_ids(&page))
            .all(&self.db)
            .await?
            .into_iter()
            .map(ServiceVersion::from)
            .collect();
        debug!(services = page.len(), versions = versions.len(), "page hydrated");
        Ok(attach_versions(page, versions))
    }

    async fn get_service(&self, id: Uuid, include_versions: bool) -> Result<Option<Service>, ServiceError> {
        let Some(found) = models::service::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut found = Service::from(found);
        if include_versions {
            found.versions = self.list_versions(id).await?;
        }
        Ok(Some(found))
    }

    async fn list_versions(&self, service_id: Uuid) -> Result<Vec<ServiceVersion>, ServiceError> {
        let rows = versions_of_service_query(service_id).all(&self.db).await?;
        Ok(rows.into_iter().map(ServiceVersion::from).collect())
    }

    async fn create_service(&self, input: NewService) -> Result<Service, ServiceError> {
        let active = models::service::new_active(&input.name, &input.description)?;
        let created = active
            .insert(&self.db)
            .await
            .map_err(|e| ServiceError::from_write(e, ServiceError::DuplicateName))?;
        Ok(Service::from(created))
    }

    async fn create_service_version(&self, input: NewServiceVersion) -> Result<ServiceVersion, ServiceError> {
        let active = models::service_version::new_active(input.service_id, &input.version)?;
        let created = active
            .insert(&self.db)
            .await
            .map_err(|e| ServiceError::from_write(e, ServiceError::DuplicateVersion))?;
        Ok(ServiceVersion::from(created))
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.db.ping().await.map_err(|e| ServiceError::StoreUnavailable(e.to_string()))
    }
}
