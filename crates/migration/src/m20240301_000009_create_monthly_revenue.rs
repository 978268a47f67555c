//! Create `monthly_revenue` table.
//!
//! One row per (company, month, year); sales upsert into it with
//! `ON CONFLICT ... DO UPDATE`, which relies on the unique index below.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MonthlyRevenue::Table)
                    .if_not_exists()
                    .col(uuid(MonthlyRevenue::Id).primary_key())
                    .col(uuid(MonthlyRevenue::CompanyId).not_null())
                    .col(small_integer(MonthlyRevenue::Month).not_null())
                    .col(integer(MonthlyRevenue::Year).not_null())
                    .col(decimal_len(MonthlyRevenue::TotalRevenue, 14, 2).not_null())
                    .col(timestamp_with_time_zone(MonthlyRevenue::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MonthlyRevenue::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monthly_revenue_company")
                            .from(MonthlyRevenue::Table, MonthlyRevenue::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_monthly_revenue_company_month_year")
                    .table(MonthlyRevenue::Table)
                    .col(MonthlyRevenue::CompanyId)
                    .col(MonthlyRevenue::Month)
                    .col(MonthlyRevenue::Year)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MonthlyRevenue::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MonthlyRevenue { Table, Id, CompanyId, Month, Year, TotalRevenue, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Company { Table, Id }
