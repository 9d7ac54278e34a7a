//! Time-sorted service listings, each index paired with the id tie-break.
use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_services::Services;

const SORT_INDEXES: [(&str, Services); 2] = [
    ("idx_services_created_at_id", Services::CreatedAt),
    ("idx_services_updated_at_id", Services::UpdatedAt),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, col) in SORT_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Services::Table)
                        .col(col)
                        .col(Services::Id)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in SORT_INDEXES {
            manager.drop_index(Index::drop().name(name).table(Services::Table).to_owned()).await?;
        }
        Ok(())
    }
}
