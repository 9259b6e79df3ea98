//! Create `catalog_service` table.
//! One row per catalog category entry; sub-services live in their own table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogService::Table)
                    .if_not_exists()
                    .col(uuid(CatalogService::Id).primary_key())
                    .col(string_len(CatalogService::Category, 64).not_null())
                    .col(string_len(CatalogService::Title, 256).not_null())
                    .col(text(CatalogService::Description).not_null())
                    .col(string_len(CatalogService::ImageUrl, 512).not_null())
                    .col(boolean(CatalogService::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(CatalogService::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CatalogService::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CatalogService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CatalogService { Table, Id, Category, Title, Description, ImageUrl, IsActive, CreatedAt, UpdatedAt }
