//! Create `company` table.
//!
//! Root entity for multi-tenancy; every business table references it.
//! Also holds the pricing defaults and monthly goals used by the targets report.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(uuid(Company::Id).primary_key())
                    .col(string_len(Company::Name, 128).not_null())
                    .col(decimal_len(Company::MonthlyFixedCost, 14, 2).not_null().default(0))
                    .col(decimal_len(Company::DefaultTaxRate, 5, 2).not_null().default(0))
                    .col(decimal_len(Company::DefaultCardFee, 5, 2).not_null().default(0))
                    .col(decimal_len(Company::DesiredMargin, 5, 2).not_null().default(0))
                    .col(decimal_len(Company::TargetProfitValue, 14, 2).not_null().default(0))
                    .col(timestamp_with_time_zone(Company::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Company::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Company::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
    Name,
    MonthlyFixedCost,
    DefaultTaxRate,
    DefaultCardFee,
    DesiredMargin,
    TargetProfitValue,
    CreatedAt,
    UpdatedAt,
}
