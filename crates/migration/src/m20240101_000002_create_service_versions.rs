//! Create `service_versions` table.
//! Rows are owned by a service and removed with it; a version string is unique per service.
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240101_000001_create_services::Services;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceVersions::Table)
                    .if_not_exists()
                    .col(uuid(ServiceVersions::Id).primary_key())
                    .col(uuid(ServiceVersions::ServiceId).not_null())
                    .col(string_len(ServiceVersions::Version, 50).not_null())
                    .col(timestamp_with_time_zone(ServiceVersions::CreatedAt).not_null())
                    .check(Expr::col(ServiceVersions::Version).ne(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_versions_service")
                            .from(ServiceVersions::Table, ServiceVersions::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A service cannot register the same version twice
        manager
            .create_index(
                Index::create()
                    .name("uniq_service_versions_service_version")
                    .table(ServiceVersions::Table)
                    .col(ServiceVersions::ServiceId)
                    .col(ServiceVersions::Version)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceVersions::Table).if_exists().to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ServiceVersions {
    Table,
    Id,
    ServiceId,
    Version,
    CreatedAt,
}
