//! Create `review` table.
//!
//! `sub_service_id` stores the identifier exactly as submitted (composite or
//! plain id). The unique index makes (user, enquiry, sub-service) a key so two
//! concurrent submissions cannot both land.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(uuid(Review::Id).primary_key())
                    .col(uuid(Review::UserId).not_null())
                    .col(uuid(Review::ServiceId).not_null())
                    .col(string_len(Review::SubServiceId, 128).not_null())
                    .col(string_len(Review::SubServiceName, 256).not_null())
                    .col(integer(Review::Rating).not_null())
                    .col(ColumnDef::new(Review::Comment).text().null())
                    .col(uuid(Review::EnquiryId).not_null())
                    .col(timestamp_with_time_zone(Review::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Review::UpdatedAt).not_null())
                    .check(Expr::col(Review::Rating).between(1, 5))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_enquiry")
                            .from(Review::Table, Review::EnquiryId)
                            .to(Enquiry::Table, Enquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_review_user_enquiry_sub_service")
                    .table(Review::Table)
                    .col(Review::UserId)
                    .col(Review::EnquiryId)
                    .col(Review::SubServiceId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    UserId,
    ServiceId,
    SubServiceId,
    SubServiceName,
    Rating,
    Comment,
    EnquiryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enquiry { Table, Id }
