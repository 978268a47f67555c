use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::sale::{self, SaleType};
use models::{monthly_revenue, product, sale_item};
use crate::errors::ServiceError;
use crate::pricing::{self, round_money};

#[derive(Debug, Clone, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleInput {
    pub date: DateTime<Utc>,
    #[serde(alias = "type")]
    pub sale_type: SaleType,
    /// Required for DAILY_TOTAL, ignored for ITEMIZED
    pub total_amount: Option<Decimal>,
    /// Required for ITEMIZED
    #[serde(default)]
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: sale::Model,
    pub items: Vec<sale_item::Model>,
}

fn validate(input: &CreateSaleInput) -> Result<(), ServiceError> {
    monthly_revenue::validate_year(input.date.year())?;
    match input.sale_type {
        SaleType::Itemized => {
            if input.items.is_empty() {
                return Err(ServiceError::Validation("At least one item is required for ITEMIZED sales".into()));
            }
            if input.items.iter().any(|i| i.quantity <= Decimal::ZERO) {
                return Err(ServiceError::Validation("item quantity must be positive".into()));
            }
        }
        SaleType::DailyTotal => match input.total_amount {
            Some(t) if t > Decimal::ZERO => {}
            _ => {
                return Err(ServiceError::Validation(
                    "Total amount is required and must be positive for DAILY_TOTAL sales".into(),
                ))
            }
        },
    }
    Ok(())
}

/// Take `qty` out of a product's stock, refusing to go below zero.
async fn decrement_stock(txn: &DatabaseTransaction, p: &product::Model, qty: Decimal) -> Result<(), ServiceError> {
    let res = product::Entity::update_many()
        .col_expr(product::Column::Stock, Expr::col(product::Column::Stock).sub(qty))
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(p.id))
        .filter(product::Column::Stock.gte(qty))
        .exec(txn)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::Validation(format!(
            "Insufficient stock for product {}. Requested: {}",
            p.name, qty
        )));
    }
    Ok(())
}

/// Record a sale and book it into the month's revenue, atomically.
///
/// Itemized sales price every line at the product's current sale price and
/// take the quantities out of stock; a daily total only books its amount.
#[instrument(skip(db, input), fields(company_id = %company_id, sale_type = ?input.sale_type))]
pub async fn create_sale(db: &DatabaseConnection, company_id: Uuid, input: CreateSaleInput) -> Result<SaleWithItems, ServiceError> {
    validate(&input)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let sale_id = Uuid::new_v4();

    let mut lines = Vec::new();
    let total = match input.sale_type {
        SaleType::DailyTotal => round_money(input.total_amount.unwrap_or_default()),
        SaleType::Itemized => {
            let mut total = Decimal::ZERO;
            for item in &input.items {
                let p = product::find_for_company(&txn, company_id, item.product_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("Product not found: {}", item.product_id)))?;
                if p.stock < item.quantity {
                    return Err(ServiceError::Validation(format!(
                        "Insufficient stock for product {}. Available: {}, Requested: {}",
                        p.name, p.stock, item.quantity
                    )));
                }
                decrement_stock(&txn, &p, item.quantity).await?;
                let sub_total = round_money(item.quantity * p.sale_price);
                total += sub_total;
                lines.push(sale_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    sale_id: Set(sale_id),
                    product_id: Set(p.id),
                    quantity: Set(item.quantity),
                    unit_price: Set(p.sale_price),
                    sub_total: Set(sub_total),
                });
            }
            total
        }
    };

    let created = sale::ActiveModel {
        id: Set(sale_id),
        company_id: Set(company_id),
        date: Set(input.date.into()),
        total_amount: Set(total),
        sale_type: Set(input.sale_type),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(ServiceError::db)?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        items.push(line.insert(&txn).await.map_err(ServiceError::db)?);
    }

    monthly_revenue::add_to_month(&txn, company_id, input.date.month() as i16, input.date.year(), total).await?;
    txn.commit().await.map_err(ServiceError::db)?;

    info!(sale_id = %created.id, total = %created.total_amount, items = items.len(), "sale_created");
    Ok(SaleWithItems { sale: created, items })
}

/// Sales with their items, newest first; `month` needs `year`.
pub async fn list_sales(db: &DatabaseConnection, company_id: Uuid, month: Option<u32>, year: Option<i32>) -> Result<Vec<SaleWithItems>, ServiceError> {
    let range = match (month, year) {
        (Some(m), Some(y)) => Some(
            pricing::month_bounds(y, m).ok_or_else(|| ServiceError::Validation("month must be between 1 and 12".into()))?,
        ),
        (None, Some(y)) => {
            let (start, _) = pricing::month_bounds(y, 1).ok_or_else(|| ServiceError::Validation("invalid year".into()))?;
            let (_, end) = pricing::month_bounds(y, 12).ok_or_else(|| ServiceError::Validation("invalid year".into()))?;
            Some((start, end))
        }
        (Some(_), None) => return Err(ServiceError::Validation("month filter requires year".into())),
        (None, None) => None,
    };
    let sales = sale::list_in_range(db, company_id, range.map(|(s, e)| (s.into(), e.into()))).await?;
    if sales.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
    let mut by_sale: HashMap<Uuid, Vec<sale_item::Model>> = HashMap::new();
    for item in sale_item::Entity::find()
        .filter(sale_item::Column::SaleId.is_in(ids))
        .order_by_asc(sale_item::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?
    {
        by_sale.entry(item.sale_id).or_default().push(item);
    }

    Ok(sales
        .into_iter()
        .map(|s| {
            let items = by_sale.remove(&s.id).unwrap_or_default();
            SaleWithItems { sale: s, items }
        })
        .collect())
}
