use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use service::catalog::domain::{Service, ServiceVersion};

use crate::errors::{HandlerError, JsonApiError};
use crate::middleware::Ctx;
use crate::state::AppState;
use crate::validation;

#[derive(Debug, Serialize)]
pub struct ServiceList {
    pub items: Vec<Service>,
}

#[derive(Debug, Serialize)]
pub struct VersionList {
    pub versions: Vec<ServiceVersion>,
}

/// List services with search, sort and pagination
#[utoipa::path(
    get,
    path = "/v1/services",
    tag = "services",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive name prefix"),
        ("sort" = Option<String>, Query, description = "name | created_at | updated_at"),
        ("order" = Option<String>, Query, description = "asc | desc"),
        ("limit" = Option<i64>, Query, description = "1..=1000, clamped to the configured page size"),
        ("offset" = Option<u64>, Query, description = "Rows to skip"),
        ("include_versions" = Option<bool>, Query, description = "Attach versions to each service"),
    ),
    responses(
        (status = 200, description = "Page of services", body = crate::openapi::ServiceListDoc),
        (status = 400, description = "Validation failed", body = crate::validation::ValidationBody),
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ServiceList>, HandlerError> {
    let params = validation::list_params(&raw)?;
    let items = state.catalog.list_services(&ctx, params).await?;
    Ok(Json(ServiceList { items }))
}

/// Get one service
#[utoipa::path(
    get,
    path = "/v1/services/{id}",
    tag = "services",
    params(
        ("id" = String, Path, description = "Service id (UUID v4)"),
        ("include_versions" = Option<bool>, Query, description = "Attach versions"),
    ),
    responses(
        (status = 200, description = "Service", body = crate::openapi::ServiceDoc),
        (status = 400, description = "Validation failed", body = crate::validation::ValidationBody),
        (status = 404, description = "Service not found", body = crate::errors::ErrorBody),
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<Service>, HandlerError> {
    let id = validation::service_id(&id)?;
    let include_versions = validation::include_versions(&raw)?;
    match state.catalog.get_service(&ctx, id, include_versions).await? {
        Some(found) => Ok(Json(found)),
        None => Err(JsonApiError::service_not_found().into()),
    }
}

/// List versions of a service, newest first
#[utoipa::path(
    get,
    path = "/v1/services/{id}/versions",
    tag = "services",
    params(("id" = String, Path, description = "Service id (UUID v4)")),
    responses(
        (status = 200, description = "Versions", body = crate::openapi::VersionListDoc),
        (status = 400, description = "Validation failed", body = crate::validation::ValidationBody),
    )
)]
pub async fn list_versions(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> Result<Json<VersionList>, HandlerError> {
    let id = validation::service_id(&id)?;
    let versions = state.catalog.list_versions(&ctx, id).await?;
    Ok(Json(VersionList { versions }))
}

/// Register a service
#[utoipa::path(
    post,
    path = "/v1/services",
    tag = "services",
    request_body = crate::validation::CreateServiceRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ServiceDoc),
        (status = 400, description = "Validation failed", body = crate::validation::ValidationBody),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorBody),
    )
)]
pub async fn create_service(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Service>), HandlerError> {
    let input = validation::create_service_body(&headers, &body)?;
    let created = state.catalog.create_service(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Add a version to a service
#[utoipa::path(
    post,
    path = "/v1/services/{id}/versions",
    tag = "services",
    params(("id" = String, Path, description = "Service id (UUID v4)")),
    request_body = crate::validation::CreateServiceVersionRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ServiceVersionDoc),
        (status = 400, description = "Validation failed", body = crate::validation::ValidationBody),
        (status = 404, description = "Service not found", body = crate::errors::ErrorBody),
        (status = 409, description = "Version already exists", body = crate::errors::ErrorBody),
    )
)]
pub async fn create_service_version(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ServiceVersion>), HandlerError> {
    let service_id = validation::service_id(&id)?;
    let input = validation::create_version_body(&headers, service_id, &body)?;
    let created = state.catalog.create_service_version(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
