//! Create `enquiry_item` table.
//! Snapshot of each purchased sub-service at checkout time.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EnquiryItem::Table)
                    .if_not_exists()
                    .col(uuid(EnquiryItem::Id).primary_key())
                    .col(uuid(EnquiryItem::EnquiryId).not_null())
                    .col(integer(EnquiryItem::Position).not_null())
                    .col(uuid(EnquiryItem::ServiceId).not_null())
                    .col(string_len(EnquiryItem::SubServiceId, 128).not_null())
                    .col(string_len(EnquiryItem::Name, 256).not_null())
                    .col(double(EnquiryItem::Price).not_null())
                    .col(integer(EnquiryItem::Quantity).not_null().default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enquiry_item_enquiry")
                            .from(EnquiryItem::Table, EnquiryItem::EnquiryId)
                            .to(Enquiry::Table, Enquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(EnquiryItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum EnquiryItem { Table, Id, EnquiryId, Position, ServiceId, SubServiceId, Name, Price, Quantity }

#[derive(DeriveIden)]
enum Enquiry { Table, Id }
