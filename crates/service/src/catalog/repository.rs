use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewService, NewServiceVersion, Service, ServiceVersion};
use super::query::EffectiveListParams;
use crate::errors::ServiceError;

/// Persistence contract of the catalog.
///
/// Reads never fail for a well-formed id that matches nothing: `get_service`
/// yields `None` and `list_versions` an empty list. Creates always assign a
/// fresh id and timestamps.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// One page of services; with `include_versions`, versions are fetched in
    /// a single batched query for the whole page.
    async fn list_services(&self, params: &EffectiveListParams) -> Result<Vec<Service>, ServiceError>;
    async fn get_service(&self, id: Uuid, include_versions: bool) -> Result<Option<Service>, ServiceError>;
    /// Newest first (`created_at desc, id desc`).
    async fn list_versions(&self, service_id: Uuid) -> Result<Vec<ServiceVersion>, ServiceError>;

    async fn create_service(&self, input: NewService) -> Result<Service, ServiceError>;
    async fn create_service_version(&self, input: NewServiceVersion) -> Result<ServiceVersion, ServiceError>;

    /// Liveness probe of the backing store.
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// In-memory repository with the same constraints as the Postgres schema:
/// unique names, unique `(service_id, version)`, owner must exist.
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Duration, Utc};
    use models::{service, service_version};

    use crate::catalog::hydration::attach_versions;
    use crate::catalog::query::{SortKey, SortOrder};

    #[derive(Default)]
    struct Tables {
        services: Vec<Service>,
        versions: Vec<ServiceVersion>,
        last_stamp: Option<DateTime<Utc>>,
        frozen_at: Option<DateTime<Utc>>,
    }

    impl Tables {
        // strictly increasing, so rows created back to back still order by time
        fn now(&mut self) -> DateTime<Utc> {
            if let Some(frozen) = self.frozen_at {
                return frozen;
            }
            let mut now = Utc::now();
            if let Some(last) = self.last_stamp {
                if now <= last {
                    now = last + Duration::microseconds(1);
                }
            }
            self.last_stamp = Some(now);
            now
        }

        fn versions_of(&self, ids: &[Uuid]) -> Vec<ServiceVersion> {
            let mut rows: Vec<ServiceVersion> =
                self.versions.iter().filter(|v| ids.contains(&v.service_id)).cloned().collect();
            rows.sort_by(|a, b| {
                a.service_id
                    .cmp(&b.service_id)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| b.id.cmp(&a.id))
            });
            rows
        }
    }

    #[derive(Default)]
    pub struct InMemoryCatalogRepository {
        tables: Mutex<Tables>,
    }

    impl InMemoryCatalogRepository {
        pub fn new() -> Self { Self::default() }

        /// Every row gets the same `created_at`/`updated_at`, so listings
        /// sorted by time fall back to the id tie-break.
        pub fn with_frozen_clock(at: DateTime<Utc>) -> Self {
            let tables = Tables { frozen_at: Some(at), ..Tables::default() };
            Self { tables: Mutex::new(tables) }
        }

        fn tables(&self) -> Result<MutexGuard<'_, Tables>, ServiceError> {
            self.tables.lock().map_err(|_| ServiceError::StoreUnavailable("in-memory store poisoned".into()))
        }
    }

    fn compare(a: &Service, b: &Service, key: SortKey) -> Ordering {
        let primary = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    #[async_trait]
    impl CatalogRepository for InMemoryCatalogRepository {
        async fn list_services(&self, params: &EffectiveListParams) -> Result<Vec<Service>, ServiceError> {
            let tables = self.tables()?;
            let prefix = params.prefix.as_deref().map(str::to_lowercase);
            let mut rows: Vec<Service> = tables
                .services
                .iter()
                .filter(|s| match &prefix {
                    Some(prefix) => s.name.to_lowercase().starts_with(prefix.as_str()),
                    None => true,
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| match params.order {
                SortOrder::Asc => compare(a, b, params.sort),
                SortOrder::Desc => compare(b, a, params.sort),
            });
            let page: Vec<Service> = rows
                .into_iter()
                .skip(usize::try_from(params.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(params.limit).unwrap_or(usize::MAX))
                .collect();
            if !params.include_versions || page.is_empty() {
                return Ok(page);
            }
            let ids: Vec<Uuid> = page.iter().map(|s| s.id).collect();
            let versions = tables.versions_of(&ids);
            Ok(attach_versions(page, versions))
        }

        async fn get_service(&self, id: Uuid, include_versions: bool) -> Result<Option<Service>, ServiceError> {
            let tables = self.tables()?;
            let Some(found) = tables.services.iter().find(|s| s.id == id).cloned() else {
                return Ok(None);
            };
            if !include_versions {
                return Ok(Some(found));
            }
            let versions = tables.versions_of(&[id]);
            Ok(attach_versions(vec![found], versions).pop())
        }

        async fn list_versions(&self, service_id: Uuid) -> Result<Vec<ServiceVersion>, ServiceError> {
            Ok(self.tables()?.versions_of(&[service_id]))
        }

        async fn create_service(&self, input: NewService) -> Result<Service, ServiceError> {
            service::validate_name(&input.name)?;
            service::validate_description(&input.description)?;
            let mut tables = self.tables()?;
            if tables.services.iter().any(|s| s.name == input.name) {
                return Err(ServiceError::DuplicateName);
            }
            let now = tables.now();
            let created = Service {
                id: Uuid::new_v4(),
                name: input.name,
                description: input.description,
                created_at: now,
                updated_at: now,
                versions: Vec::new(),
            };
            tables.services.push(created.clone());
            Ok(created)
        }

        async fn create_service_version(&self, input: NewServiceVersion) -> Result<ServiceVersion, ServiceError> {
            service_version::validate_version(&input.version)?;
            let mut tables = self.tables()?;
            if !tables.services.iter().any(|s| s.id == input.service_id) {
                return Err(ServiceError::OrphanReference);
            }
            if tables.versions.iter().any(|v| v.service_id == input.service_id && v.version == input.version) {
                return Err(ServiceError::DuplicateVersion);
            }
            let created = ServiceVersion {
                id: Uuid::new_v4(),
                service_id: input.service_id,
                version: input.version,
                created_at: tables.now(),
            };
            tables.versions.push(created.clone());
            Ok(created)
        }

        async fn ping(&self) -> Result<(), ServiceError> {
            self.tables().map(|_| ())
        }
    }
}
