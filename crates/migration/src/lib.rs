//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_user;
mod m20250301_000002_create_catalog_service;
mod m20250301_000003_create_sub_service;
mod m20250301_000004_create_enquiry;
mod m20250301_000005_create_enquiry_item;
mod m20250301_000006_create_review;
mod m20250301_000007_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_user::Migration),
            Box::new(m20250301_000002_create_catalog_service::Migration),
            Box::new(m20250301_000003_create_sub_service::Migration),
            Box::new(m20250301_000004_create_enquiry::Migration),
            Box::new(m20250301_000005_create_enquiry_item::Migration),
            Box::new(m20250301_000006_create_review::Migration),
            // Indexes should always be applied last
            Box::new(m20250301_000007_add_indexes::Migration),
        ]
    }
}
