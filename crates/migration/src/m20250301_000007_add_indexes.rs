use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Review: lookups by sub-service identifier (aggregate + public listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_sub_service")
                    .table(Review::Table)
                    .col(Review::SubServiceId)
                    .to_owned(),
            )
            .await?;

        // Review: completion tracking counts per enquiry
        manager
            .create_index(
                Index::create()
                    .name("idx_review_enquiry")
                    .table(Review::Table)
                    .col(Review::EnquiryId)
                    .to_owned(),
            )
            .await?;

        // Enquiry: customer listing
        manager
            .create_index(
                Index::create()
                    .name("idx_enquiry_user")
                    .table(Enquiry::Table)
                    .col(Enquiry::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enquiry_item_enquiry")
                    .table(EnquiryItem::Table)
                    .col(EnquiryItem::EnquiryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_review_sub_service").table(Review::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_review_enquiry").table(Review::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_enquiry_user").table(Enquiry::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_enquiry_item_enquiry").table(EnquiryItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Review { Table, SubServiceId, EnquiryId }

#[derive(DeriveIden)]
enum Enquiry { Table, UserId }

#[derive(DeriveIden)]
enum EnquiryItem { Table, EnquiryId }
