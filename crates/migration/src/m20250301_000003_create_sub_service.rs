//! Create `sub_service` table.
//!
//! `position` keeps the catalog order; composite identifiers of the form
//! `{serviceId}-{index}` point at it. `rating`/`num_reviews` are a cache
//! recomputed from `review`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubService::Table)
                    .if_not_exists()
                    .col(uuid(SubService::Id).primary_key())
                    .col(uuid(SubService::ServiceId).not_null())
                    .col(integer(SubService::Position).not_null())
                    .col(string_len(SubService::Name, 256).not_null())
                    .col(text(SubService::Description).not_null())
                    .col(double(SubService::Price).not_null())
                    .col(ColumnDef::new(SubService::ActualPrice).double().null())
                    .col(string_len(SubService::ImageUrl, 512).not_null())
                    .col(json_binary(SubService::IssuesResolved).not_null())
                    .col(double(SubService::Rating).not_null().default(0.0))
                    .col(integer(SubService::NumReviews).not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_service_catalog_service")
                            .from(SubService::Table, SubService::ServiceId)
                            .to(CatalogService::Table, CatalogService::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_sub_service_position")
                    .table(SubService::Table)
                    .col(SubService::ServiceId)
                    .col(SubService::Position)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SubService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SubService {
    Table,
    Id,
    ServiceId,
    Position,
    Name,
    Description,
    Price,
    ActualPrice,
    ImageUrl,
    IssuesResolved,
    Rating,
    NumReviews,
}

#[derive(DeriveIden)]
enum CatalogService { Table, Id }
