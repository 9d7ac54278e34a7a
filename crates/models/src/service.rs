use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, service_version};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Versions }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Versions => Entity::has_many(service_version::Entity).into(),
        }
    }
}

impl Related<service_version::Entity> for Entity {
    fn to() -> RelationDef { Relation::Versions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.is_empty() {
        return Err(errors::ModelError::Validation("name is required".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("name too long (max {NAME_MAX_LEN} characters)")));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(errors::ModelError::Validation(format!(
            "description too long (max {DESCRIPTION_MAX_LEN} characters)"
        )));
    }
    Ok(())
}

/// Validate the fields and build an insertable row with a fresh id and
/// `created_at == updated_at == now (UTC)`.
pub fn new_active(name: &str, description: &str) -> Result<ActiveModel, errors::ModelError> {
    validate_name(name)?;
    validate_description(description)?;
    let now = Utc::now().into();
    Ok(ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    })
}
