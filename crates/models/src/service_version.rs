use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, service};

pub const VERSION_MAX_LEN: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub version: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_version(version: &str) -> Result<(), errors::ModelError> {
    if version.is_empty() {
        return Err(errors::ModelError::Validation("version is required".into()));
    }
    if version.chars().count() > VERSION_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("version too long (max {VERSION_MAX_LEN} characters)")));
    }
    Ok(())
}

/// Validate and build an insertable version row owned by `service_id`.
/// The owner's existence is left to the foreign key.
pub fn new_active(service_id: Uuid, version: &str) -> Result<ActiveModel, errors::ModelError> {
    validate_version(version)?;
    Ok(ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service_id),
        version: Set(version.to_string()),
        created_at: Set(Utc::now().into()),
    })
}
