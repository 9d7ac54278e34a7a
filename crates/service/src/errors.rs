use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("service name already exists")]
    DuplicateName,
    #[error("version already exists for this service")]
    DuplicateVersion,
    #[error("referenced service does not exist")]
    OrphanReference,
    #[error("operation timed out: {0}")]
    Timeout(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    /// Stable, machine-distinguishable kind for external mapping/logging
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::ConstraintViolation(_) => "constraint_violation",
            ServiceError::DuplicateName => "duplicate_name",
            ServiceError::DuplicateVersion => "duplicate_version",
            ServiceError::OrphanReference => "orphan_reference",
            ServiceError::Timeout(_) => "timeout",
            ServiceError::StoreUnavailable(_) => "store_unavailable",
            ServiceError::Db(_) => "internal",
        }
    }

    /// Classify a failed insert. `on_unique` is the error the caller's unique
    /// constraint stands for (`DuplicateName` or `DuplicateVersion`).
    pub fn from_write(err: DbErr, on_unique: ServiceError) -> Self {
        match classify(&err) {
            StoreFailure::UniqueViolation => on_unique,
            StoreFailure::ForeignKeyViolation => ServiceError::OrphanReference,
            StoreFailure::CheckViolation => ServiceError::ConstraintViolation("rejected by store check constraint".into()),
            StoreFailure::Unavailable => ServiceError::StoreUnavailable(err.to_string()),
            StoreFailure::Other => ServiceError::Db(err.to_string()),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match classify(&err) {
            StoreFailure::Unavailable => ServiceError::StoreUnavailable(err.to_string()),
            _ => ServiceError::Db(err.to_string()),
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(err: models::errors::ModelError) -> Self {
        let models::errors::ModelError::Validation(msg) = err;
        ServiceError::ConstraintViolation(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    UniqueViolation,
    ForeignKeyViolation,
    CheckViolation,
    Unavailable,
    Other,
}

pub(crate) fn classify(err: &DbErr) -> StoreFailure {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => return StoreFailure::UniqueViolation,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => return StoreFailure::ForeignKeyViolation,
        _ => {}
    }
    if matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)) {
        return StoreFailure::Unavailable;
    }
    // Postgres message texts; check violations have no `SqlErr` variant
    let msg = err.to_string();
    if msg.contains("violates check constraint") {
        StoreFailure::CheckViolation
    } else if msg.contains("duplicate key value violates unique constraint") {
        StoreFailure::UniqueViolation
    } else if msg.contains("violates foreign key constraint") {
        StoreFailure::ForeignKeyViolation
    } else {
        StoreFailure::Other
    }
}
