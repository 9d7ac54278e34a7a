//! Create `services` table.
//! `name` is unique and case-sensitive; an empty name is rejected by a check constraint.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(uuid(Services::Id).primary_key())
                    .col(string_len(Services::Name, 100).not_null().unique_key())
                    .col(text(Services::Description).not_null().default(""))
                    .col(timestamp_with_time_zone(Services::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Services::UpdatedAt).not_null())
                    .check(Expr::col(Services::Name).ne(""))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Services::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Services {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}
