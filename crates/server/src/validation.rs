//! Strict request validation.
//!
//! Everything here rejects; the engine's lenient fallbacks are never relied
//! on for values that came from a client.

use std::collections::HashMap;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::{service as service_entity, service_version};
use service::catalog::domain::{NewService, NewServiceVersion};
use service::catalog::query::{ListServicesParams, SortKey, SortOrder};

pub const LIMIT_MAX: i64 = 1000;
pub const LIMIT_MAX_DIGITS: usize = 10;
pub const QUERY_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errs = Self::default();
        errs.push(field, message);
        errs
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError { field: field.to_string(), message: message.into() });
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn errors(&self) -> &[FieldError] { &self.0 }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationBody {
    pub error: String,
    pub errors: Vec<FieldError>,
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        tracing::debug!(errors = ?self.0, "validation failed");
        (StatusCode::BAD_REQUEST, Json(ValidationBody { error: "Validation failed".to_string(), errors: self.0 })).into_response()
    }
}

/// Empty values count as absent.
fn param<'a>(raw: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    raw.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn include_versions_into(raw: &HashMap<String, String>, errs: &mut ValidationErrors) -> bool {
    match param(raw, "include_versions") {
        None | Some("false") => false,
        Some("true") => true,
        Some(_) => {
            errs.push("include_versions", "must be either 'true' or 'false'");
            false
        }
    }
}

/// Validate `GET /v1/services` query parameters into engine parameters.
pub fn list_params(raw: &HashMap<String, String>) -> Result<ListServicesParams, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    let mut params = ListServicesParams::new();

    if let Some(limit) = param(raw, "limit") {
        match limit.parse::<i64>() {
            Ok(l) if (1..=LIMIT_MAX).contains(&l) => params = params.limit(l),
            _ => errs.push("limit", format!("must be a positive integer between 1 and {LIMIT_MAX}")),
        }
        if limit.len() > LIMIT_MAX_DIGITS {
            errs.push("limit", format!("limit parameter string must be {LIMIT_MAX_DIGITS} characters or less"));
        }
    }

    if let Some(offset) = param(raw, "offset") {
        match offset.parse::<u64>() {
            Ok(o) => params = params.offset(o),
            Err(_) => errs.push("offset", "must be a non-negative integer"),
        }
    }

    let sort = match param(raw, "sort").map(str::parse::<SortKey>) {
        None => SortKey::default(),
        Some(Ok(key)) => key,
        Some(Err(msg)) => {
            errs.push("sort", msg);
            SortKey::default()
        }
    };
    let order = match param(raw, "order").map(str::parse::<SortOrder>) {
        None => SortOrder::default(),
        Some(Ok(order)) => order,
        Some(Err(msg)) => {
            errs.push("order", msg);
            SortOrder::default()
        }
    };
    params = params.sort(sort, order);

    params = params.include_versions(include_versions_into(raw, &mut errs));

    if let Some(q) = param(raw, "q") {
        if q.chars().count() > QUERY_MAX_LEN {
            errs.push("q", format!("search query must be {QUERY_MAX_LEN} characters or less"));
        } else {
            params = params.search(q);
        }
    }

    errs.into_result(params)
}

/// Validate `include_versions` on single-service reads.
pub fn include_versions(raw: &HashMap<String, String>) -> Result<bool, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    let value = include_versions_into(raw, &mut errs);
    errs.into_result(value)
}

/// Path identifiers must be UUID version 4.
pub fn service_id(raw: &str) -> Result<Uuid, ValidationErrors> {
    if raw.is_empty() {
        return Err(ValidationErrors::single("id", "ID cannot be empty"));
    }
    let id = Uuid::parse_str(raw).map_err(|_| ValidationErrors::single("id", "ID must be a valid UUID"))?;
    if id.get_version_num() != 4 {
        return Err(ValidationErrors::single("id", "ID must be a valid UUIDv4"));
    }
    Ok(id)
}

/// A missing Content-Type is accepted; a present one must be JSON.
pub fn json_content_type(headers: &HeaderMap) -> Result<(), ValidationErrors> {
    match headers.get(header::CONTENT_TYPE) {
        None => Ok(()),
        Some(v) if v.to_str().map(|s| s.contains("application/json")).unwrap_or(false) => Ok(()),
        Some(_) => Err(ValidationErrors::single("Content-Type", "must be application/json")),
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateServiceRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateServiceVersionRequest {
    #[serde(default)]
    pub version: String,
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, ValidationErrors> {
    serde_json::from_slice(body).map_err(|_| ValidationErrors::single("body", "Invalid JSON format"))
}

/// Decode and check a create-service body. Ids and timestamps in the body
/// are ignored.
pub fn create_service_body(headers: &HeaderMap, body: &[u8]) -> Result<NewService, ValidationErrors> {
    json_content_type(headers)?;
    let req: CreateServiceRequest = parse_body(body)?;
    let mut errs = ValidationErrors::default();
    if req.name.is_empty() {
        errs.push("name", "Name is required");
    } else if req.name.chars().count() > service_entity::NAME_MAX_LEN {
        errs.push("name", format!("Name too long (max {} characters)", service_entity::NAME_MAX_LEN));
    }
    if req.description.chars().count() > service_entity::DESCRIPTION_MAX_LEN {
        errs.push("description", format!("Description too long (max {} characters)", service_entity::DESCRIPTION_MAX_LEN));
    }
    errs.into_result(NewService { name: req.name, description: req.description })
}

pub fn create_version_body(headers: &HeaderMap, service_id: Uuid, body: &[u8]) -> Result<NewServiceVersion, ValidationErrors> {
    json_content_type(headers)?;
    let req: CreateServiceVersionRequest = parse_body(body)?;
    if req.version.is_empty() {
        return Err(ValidationErrors::single("version", "Version is required"));
    }
    if req.version.chars().count() > service_version::VERSION_MAX_LEN {
        return Err(ValidationErrors::single(
            "version",
            format!("Version too long (max {} characters)", service_version::VERSION_MAX_LEN),
        ));
    }
    Ok(NewServiceVersion { service_id, version: req.version })
}
