use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{category, company, product, sale_item};
use crate::company_service::{get_company, rates_of};
use crate::errors::ServiceError;
use crate::pricing::{self, PricingResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    /// Falls back to the company's default category
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    pub cost_price: Decimal,
    /// Explicit price; otherwise the smart price is suggested
    pub sale_price: Option<Decimal>,
    pub stock: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub stock: Option<Decimal>,
}

/// Price simulation; rates default to the company settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingSimulationInput {
    pub cost_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub card_fee: Option<Decimal>,
    pub desired_margin: Option<Decimal>,
}

async fn resolve_category(db: &DatabaseConnection, company_id: Uuid, category_id: Option<Uuid>) -> Result<Uuid, ServiceError> {
    match category_id {
        Some(id) => {
            let found = category::Entity::find_by_id(id)
                .filter(category::Column::CompanyId.eq(company_id))
                .one(db)
                .await
                .map_err(ServiceError::db)?;
            found.map(|c| c.id).ok_or_else(|| ServiceError::not_found("category"))
        }
        None => {
            if let Some(c) = category::find_by_name(db, company_id, category::DEFAULT_CATEGORY_NAME).await? {
                return Ok(c.id);
            }
            Ok(category::create(db, company_id, category::DEFAULT_CATEGORY_NAME).await?.id)
        }
    }
}

fn validate_money(cost: Option<Decimal>, sale: Option<Decimal>, stock: Option<Decimal>) -> Result<(), ServiceError> {
    if let Some(v) = cost { product::validate_amount("cost_price", v)?; }
    if let Some(v) = sale { product::validate_amount("sale_price", v)?; }
    if let Some(v) = stock { product::validate_amount("stock", v)?; }
    Ok(())
}

fn price_for(c: &company::Model, cost: Decimal, sale: Option<Decimal>) -> PricingResult {
    pricing::calculate_smart_pricing(cost, &rates_of(c), sale)
}

#[instrument(skip(db, input), fields(company_id = %company_id))]
pub async fn create_product(db: &DatabaseConnection, company_id: Uuid, input: CreateProductInput) -> Result<product::Model, ServiceError> {
    product::validate_name(&input.name)?;
    let unit = input.unit.unwrap_or_else(|| product::DEFAULT_UNIT.to_string());
    product::validate_unit(&unit)?;
    validate_money(Some(input.cost_price), input.sale_price, input.stock)?;

    let c = get_company(db, company_id).await?;
    let category_id = resolve_category(db, company_id, input.category_id).await?;
    let priced = price_for(&c, input.cost_price, input.sale_price);

    let now = Utc::now().into();
    let am = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        category_id: Set(category_id),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description.filter(|d| !d.trim().is_empty())),
        unit: Set(unit.trim().to_string()),
        cost_price: Set(priced.cost_price),
        sale_price: Set(priced.sale_price),
        markup: Set(priced.markup),
        stock: Set(input.stock.unwrap_or(Decimal::ZERO)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await.map_err(ServiceError::db)?;
    info!(product_id = %created.id, sale_price = %created.sale_price, suggested = priced.suggested, "product_created");
    Ok(created)
}

pub async fn list_products(db: &DatabaseConnection, company_id: Uuid) -> Result<Vec<product::Model>, ServiceError> {
    Ok(product::list_by_company(db, company_id).await?)
}

pub async fn get_product(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<product::Model, ServiceError> {
    product::find_for_company(db, company_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("product"))
}

/// Update and re-price.
///
/// An explicit `sale_price` wins; a new cost without a price gets a fresh
/// suggestion; otherwise the current price is kept and only markup is refreshed.
#[instrument(skip(db, input), fields(company_id = %company_id, product_id = %id))]
pub async fn update_product(db: &DatabaseConnection, company_id: Uuid, id: Uuid, input: UpdateProductInput) -> Result<product::Model, ServiceError> {
    if let Some(n) = &input.name { product::validate_name(n)?; }
    if let Some(u) = &input.unit { product::validate_unit(u)?; }
    validate_money(input.cost_price, input.sale_price, input.stock)?;

    let existing = get_product(db, company_id, id).await?;
    let c = get_company(db, company_id).await?;
    let cost = input.cost_price.unwrap_or(existing.cost_price);
    let priced = match (input.sale_price, input.cost_price) {
        (Some(sale), _) => price_for(&c, cost, Some(sale)),
        (None, Some(_)) => price_for(&c, cost, None),
        (None, None) => price_for(&c, cost, Some(existing.sale_price)),
    };

    let category_id = match input.category_id {
        Some(cid) => Some(resolve_category(db, company_id, Some(cid)).await?),
        None => None,
    };

    let mut am: product::ActiveModel = existing.into();
    if let Some(n) = input.name { am.name = Set(n.trim().to_string()); }
    if let Some(d) = input.description { am.description = Set(Some(d).filter(|d| !d.trim().is_empty())); }
    if let Some(u) = input.unit { am.unit = Set(u.trim().to_string()); }
    if let Some(cid) = category_id { am.category_id = Set(cid); }
    if let Some(s) = input.stock { am.stock = Set(s); }
    am.cost_price = Set(priced.cost_price);
    am.sale_price = Set(priced.sale_price);
    am.markup = Set(priced.markup);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    Ok(updated)
}

/// Delete a product that has never been sold.
#[instrument(skip(db), fields(company_id = %company_id, product_id = %id))]
pub async fn delete_product(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_product(db, company_id, id).await?;
    let sold = sale_item::Entity::find()
        .filter(sale_item::Column::ProductId.eq(id))
        .count(db)
        .await
        .map_err(ServiceError::db)?;
    if sold > 0 {
        return Err(ServiceError::Conflict("product has recorded sales".into()));
    }
    existing.delete(db).await.map_err(ServiceError::db)?;
    info!("product_deleted");
    Ok(())
}

/// Price a hypothetical product; nothing is stored.
pub async fn simulate_pricing(db: &DatabaseConnection, company_id: Uuid, input: PricingSimulationInput) -> Result<PricingResult, ServiceError> {
    validate_money(Some(input.cost_price), input.sale_price, None)?;
    let c = get_company(db, company_id).await?;
    let mut rates = rates_of(&c);
    if let Some(v) = input.tax_rate { company::validate_percent("tax_rate", v)?; rates.tax_rate = v; }
    if let Some(v) = input.card_fee { company::validate_percent("card_fee", v)?; rates.card_fee = v; }
    if let Some(v) = input.desired_margin { company::validate_percent("desired_margin", v)?; rates.desired_margin = v; }
    Ok(pricing::calculate_smart_pricing(input.cost_price, &rates, input.sale_price))
}
