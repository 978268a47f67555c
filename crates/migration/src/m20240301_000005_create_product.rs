//! Create `product` table.
//!
//! `sale_price` and `markup` are written by the pricing service; `stock` is
//! decremented by itemized sales. Categories in use cannot be deleted.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(uuid(Product::CompanyId).not_null())
                    .col(uuid(Product::CategoryId).not_null())
                    .col(string_len(Product::Name, 128).not_null())
                    .col(ColumnDef::new(Product::Description).text().null())
                    .col(string_len(Product::Unit, 16).not_null())
                    .col(decimal_len(Product::CostPrice, 14, 2).not_null())
                    .col(decimal_len(Product::SalePrice, 14, 2).not_null())
                    .col(decimal_len(Product::Markup, 10, 2).not_null().default(0))
                    .col(decimal_len(Product::Stock, 14, 3).not_null().default(0))
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_company")
                            .from(Product::Table, Product::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Product::Table, Product::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    CompanyId,
    CategoryId,
    Name,
    Description,
    Unit,
    CostPrice,
    SalePrice,
    Markup,
    Stock,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Company { Table, Id }

#[derive(DeriveIden)]
enum Category { Table, Id }
