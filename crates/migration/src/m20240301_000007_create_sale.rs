//! Create `sale` table (ITEMIZED or DAILY_TOTAL).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(uuid(Sale::Id).primary_key())
                    .col(uuid(Sale::CompanyId).not_null())
                    .col(timestamp_with_time_zone(Sale::Date).not_null())
                    .col(decimal_len(Sale::TotalAmount, 14, 2).not_null())
                    .col(string_len(Sale::SaleType, 16).not_null())
                    .col(timestamp_with_time_zone(Sale::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_company")
                            .from(Sale::Table, Sale::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Sale::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Sale { Table, Id, CompanyId, Date, TotalAmount, SaleType, CreatedAt }

#[derive(DeriveIden)]
enum Company { Table, Id }
