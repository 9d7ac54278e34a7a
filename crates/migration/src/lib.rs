//! Migrator registering the catalog tables in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_services;
mod m20240101_000002_create_service_versions;
mod m20240101_000003_add_indexes;
mod m20240101_000004_add_sort_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_services::Migration),
            Box::new(m20240101_000002_create_service_versions::Migration),
            // Indexes should always be applied after the tables
            Box::new(m20240101_000003_add_indexes::Migration),
            Box::new(m20240101_000004_add_sort_indexes::Migration),
        ]
    }
}
