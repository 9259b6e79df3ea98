//! Create `enquiry` table (customer orders).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enquiry::Table)
                    .if_not_exists()
                    .col(uuid(Enquiry::Id).primary_key())
                    .col(uuid(Enquiry::UserId).not_null())
                    .col(string_len(Enquiry::ServiceType, 128).not_null())
                    .col(string_len(Enquiry::ApplianceType, 128).not_null())
                    .col(text(Enquiry::Message).not_null())
                    .col(text(Enquiry::Address).not_null())
                    .col(string_len(Enquiry::Landmark, 256).not_null().default(""))
                    .col(string_len(Enquiry::City, 128).not_null())
                    .col(string_len(Enquiry::State, 128).not_null())
                    .col(string_len(Enquiry::Pincode, 16).not_null())
                    .col(string_len(Enquiry::Brand, 128).not_null().default(""))
                    .col(string_len(Enquiry::Status, 16).not_null().default("pending"))
                    .col(boolean(Enquiry::IsReviewed).not_null().default(false))
                    .col(timestamp_with_time_zone(Enquiry::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Enquiry::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enquiry_user")
                            .from(Enquiry::Table, Enquiry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Enquiry::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Enquiry {
    Table,
    Id,
    UserId,
    ServiceType,
    ApplianceType,
    Message,
    Address,
    Landmark,
    City,
    State,
    Pincode,
    Brand,
    Status,
    IsReviewed,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
