//! Create `sale_item` table; unit price is frozen at sale time.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SaleItem::Table)
                    .if_not_exists()
                    .col(uuid(SaleItem::Id).primary_key())
                    .col(uuid(SaleItem::SaleId).not_null())
                    .col(uuid(SaleItem::ProductId).not_null())
                    .col(decimal_len(SaleItem::Quantity, 14, 3).not_null())
                    .col(decimal_len(SaleItem::UnitPrice, 14, 2).not_null())
                    .col(decimal_len(SaleItem::SubTotal, 14, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_item_sale")
                            .from(SaleItem::Table, SaleItem::SaleId)
                            .to(Sale::Table, Sale::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_item_product")
                            .from(SaleItem::Table, SaleItem::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SaleItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SaleItem { Table, Id, SaleId, ProductId, Quantity, UnitPrice, SubTotal }

#[derive(DeriveIden)]
enum Sale { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }
