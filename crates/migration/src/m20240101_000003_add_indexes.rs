use sea_orm_migration::prelude::*;

use crate::m20240101_000002_create_service_versions::ServiceVersions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Services: case-insensitive prefix search on name
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_services_name_lower ON services (LOWER(name) text_pattern_ops)",
            )
            .await?;

        // ServiceVersions: per-service listing, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_service_versions_service_created")
                    .table(ServiceVersions::Table)
                    .col(ServiceVersions::ServiceId)
                    .col((ServiceVersions::CreatedAt, IndexOrder::Desc))
                    .col((ServiceVersions::Id, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_services_name_lower")
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_service_versions_service_created")
                    .table(ServiceVersions::Table)
                    .to_owned(),
            )
            .await
    }
}
