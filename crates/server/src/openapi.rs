use axum::Json;
use chrono::{DateTime, Utc};
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ServiceVersionDoc {
    pub id: Uuid,
    pub service_id: Uuid,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

#[derive(ToSchema)]
pub struct ServiceDoc {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// present only when versions were requested and exist
    pub versions: Option<Vec<ServiceVersionDoc>>,
}

#[derive(ToSchema)]
pub struct ServiceListDoc { pub items: Vec<ServiceDoc> }

#[derive(ToSchema)]
pub struct VersionListDoc { pub versions: Vec<ServiceVersionDoc> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthz,
        crate::routes::health::readyz,
        crate::routes::services::list_services,
        crate::routes::services::get_service,
        crate::routes::services::list_versions,
        crate::routes::services::create_service,
        crate::routes::services::create_service_version,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceDoc,
            ServiceVersionDoc,
            ServiceListDoc,
            VersionListDoc,
            crate::validation::CreateServiceRequest,
            crate::validation::CreateServiceVersionRequest,
            crate::validation::FieldError,
            crate::validation::ValidationBody,
            crate::errors::ErrorBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "services")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
