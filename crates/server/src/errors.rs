use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

use crate::validation::ValidationErrors;

/// Error body returned to clients: a stable kind plus a safe message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { error: error.into(), message: message.into() } }
    }

    pub fn service_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "Service not found")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let kind = e.kind();
        let (status, message) = match &e {
            ServiceError::ConstraintViolation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::DuplicateName => (StatusCode::CONFLICT, "Service with this name already exists".to_string()),
            ServiceError::DuplicateVersion => (StatusCode::CONFLICT, "Version already exists for this service".to_string()),
            ServiceError::OrphanReference => return Self::service_not_found(),
            ServiceError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "The operation timed out".to_string()),
            ServiceError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "Storage is temporarily unavailable".to_string()),
            ServiceError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };
        // raw detail stays in the log
        if status.is_server_error() {
            error!(kind, error = %e, "request failed");
        } else {
            warn!(kind, error = %e, "request rejected");
        }
        Self::new(status, kind, message)
    }
}

/// Anything a handler can fail with.
#[derive(Debug)]
pub enum HandlerError {
    Validation(ValidationErrors),
    Api(JsonApiError),
}

impl From<ValidationErrors> for HandlerError {
    fn from(e: ValidationErrors) -> Self { HandlerError::Validation(e) }
}

impl From<JsonApiError> for HandlerError {
    fn from(e: JsonApiError) -> Self { HandlerError::Api(e) }
}

impl From<ServiceError> for HandlerError {
    fn from(e: ServiceError) -> Self { HandlerError::Api(e.into()) }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Validation(e) => e.into_response(),
            HandlerError::Api(e) => e.into_response(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database setup failed: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
