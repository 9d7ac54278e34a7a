use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered service (business view).
///
/// `versions` is transient: empty unless hydrated, and omitted from JSON
/// when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<ServiceVersion>,
}

/// A version label owned by exactly one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVersion {
    pub id: Uuid,
    pub service_id: Uuid,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

/// Creation input. Identifier and timestamps are never caller-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Creation input for a version of `service_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServiceVersion {
    pub service_id: Uuid,
    pub version: String,
}

impl From<models::service::Model> for Service {
    fn from(m: models::service::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            versions: Vec::new(),
        }
    }
}

impl From<models::service_version::Model> for ServiceVersion {
    fn from(m: models::service_version::Model) -> Self {
        Self {
            id: m.id,
            service_id: m.service_id,
            version: m.version,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}
