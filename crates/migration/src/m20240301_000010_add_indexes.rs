use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users: index on company_id
        manager
            .create_index(
                Index::create()
                    .name("idx_user_company")
                    .table(User::Table)
                    .col(User::CompanyId)
                    .to_owned(),
            )
            .await?;

        // Products are always listed per company
        manager
            .create_index(
                Index::create()
                    .name("idx_product_company")
                    .table(Product::Table)
                    .col(Product::CompanyId)
                    .to_owned(),
            )
            .await?;

        // Expenses: list ordered by due date, month window scans
        manager
            .create_index(
                Index::create()
                    .name("idx_expense_company_due")
                    .table(Expense::Table)
                    .col(Expense::CompanyId)
                    .col(Expense::DueDate)
                    .to_owned(),
            )
            .await?;

        // Sales: month/year filters on date
        manager
            .create_index(
                Index::create()
                    .name("idx_sale_company_date")
                    .table(Sale::Table)
                    .col(Sale::CompanyId)
                    .col(Sale::Date)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sale_item_sale")
                    .table(SaleItem::Table)
                    .col(SaleItem::SaleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_company").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_company").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_expense_company_due").table(Expense::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sale_company_date").table(Sale::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sale_item_sale").table(SaleItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, CompanyId }

#[derive(DeriveIden)]
enum Product { Table, CompanyId }

#[derive(DeriveIden)]
enum Expense { Table, CompanyId, DueDate }

#[derive(DeriveIden)]
enum Sale { Table, CompanyId, Date }

#[derive(DeriveIden)]
enum SaleItem { Table, SaleId }
