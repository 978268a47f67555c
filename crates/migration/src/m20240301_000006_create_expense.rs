//! Create `expense` table.
//!
//! Installment expenses share `installment_group_id`; each row carries its
//! position (`installment_number` of `installment_count`).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expense::Table)
                    .if_not_exists()
                    .col(uuid(Expense::Id).primary_key())
                    .col(uuid(Expense::CompanyId).not_null())
                    .col(string_len(Expense::Description, 255).not_null())
                    .col(decimal_len(Expense::Amount, 14, 2).not_null())
                    .col(timestamp_with_time_zone(Expense::DueDate).not_null())
                    .col(
                        ColumnDef::new(Expense::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(Expense::Status, 16).not_null())
                    .col(string_len(Expense::Category, 16).not_null())
                    .col(boolean(Expense::IsRecurring).not_null().default(false))
                    .col(integer(Expense::InstallmentNumber).not_null().default(1))
                    .col(integer(Expense::InstallmentCount).not_null().default(1))
                    .col(ColumnDef::new(Expense::InstallmentGroupId).uuid().null())
                    .col(timestamp_with_time_zone(Expense::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Expense::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_company")
                            .from(Expense::Table, Expense::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Expense::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Expense {
    Table,
    Id,
    CompanyId,
    Description,
    Amount,
    DueDate,
    PaidAt,
    Status,
    Category,
    IsRecurring,
    InstallmentNumber,
    InstallmentCount,
    InstallmentGroupId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Company { Table, Id }
