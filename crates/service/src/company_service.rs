use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{company, expense, monthly_revenue, product};
use crate::errors::ServiceError;
use crate::pricing::{self, PricingRates, SalesTarget, SalesTargetInput};

/// Partial update of the company settings; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettingsInput {
    pub name: Option<String>,
    pub monthly_fixed_cost: Option<Decimal>,
    pub default_tax_rate: Option<Decimal>,
    pub default_card_fee: Option<Decimal>,
    pub desired_margin: Option<Decimal>,
    pub target_profit_value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesTargetReport {
    pub month: u32,
    pub year: i32,
    #[serde(flatten)]
    pub target: SalesTarget,
}

pub fn rates_of(c: &company::Model) -> PricingRates {
    PricingRates { tax_rate: c.default_tax_rate, card_fee: c.default_card_fee, desired_margin: c.desired_margin }
}

pub async fn get_company(db: &DatabaseConnection, company_id: Uuid) -> Result<company::Model, ServiceError> {
    company::Entity::find_by_id(company_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("company"))
}

fn validate_settings(input: &UpdateSettingsInput) -> Result<(), ServiceError> {
    if let Some(name) = &input.name { company::validate_name(name)?; }
    if let Some(v) = input.monthly_fixed_cost { company::validate_non_negative("monthly_fixed_cost", v)?; }
    if let Some(v) = input.target_profit_value { company::validate_non_negative("target_profit_value", v)?; }
    if let Some(v) = input.default_tax_rate { company::validate_percent("default_tax_rate", v)?; }
    if let Some(v) = input.default_card_fee { company::validate_percent("default_card_fee", v)?; }
    if let Some(v) = input.desired_margin { company::validate_percent("desired_margin", v)?; }
    Ok(())
}

#[instrument(skip(db, input), fields(company_id = %company_id))]
pub async fn update_settings(db: &DatabaseConnection, company_id: Uuid, input: UpdateSettingsInput) -> Result<company::Model, ServiceError> {
    validate_settings(&input)?;
    let mut am: company::ActiveModel = get_company(db, company_id).await?.into();
    if let Some(name) = input.name { am.name = Set(name.trim().to_string()); }
    if let Some(v) = input.monthly_fixed_cost { am.monthly_fixed_cost = Set(pricing::round_money(v)); }
    if let Some(v) = input.default_tax_rate { am.default_tax_rate = Set(pricing::round_money(v)); }
    if let Some(v) = input.default_card_fee { am.default_card_fee = Set(pricing::round_money(v)); }
    if let Some(v) = input.desired_margin { am.desired_margin = Set(pricing::round_money(v)); }
    if let Some(v) = input.target_profit_value { am.target_profit_value = Set(pricing::round_money(v)); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    info!(company_id = %updated.id, "company_settings_updated");
    Ok(updated)
}

/// Resolve an optional `(month, year)` against `today`, validating the month.
pub fn resolve_period(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<(u32, i32), ServiceError> {
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    if !(1..=12).contains(&month) {
        return Err(ServiceError::Validation("month must be between 1 and 12".into()));
    }
    models::monthly_revenue::validate_year(year)?;
    Ok((month, year))
}

/// Sales needed in a month to pay fixed costs and expenses and reach the profit goal.
///
/// Every expense due in the month or marked recurring counts as a variable
/// expense, FIXED-category ones included. Those are added on top of the
/// company's `monthly_fixed_cost` rather than replacing it.
#[instrument(skip(db), fields(company_id = %company_id))]
pub async fn sales_targets(
    db: &DatabaseConnection,
    company_id: Uuid,
    month: u32,
    year: i32,
    today: NaiveDate,
) -> Result<SalesTargetReport, ServiceError> {
    let c = get_company(db, company_id).await?;
    let (start, end) = pricing::month_bounds(year, month)
        .ok_or_else(|| ServiceError::Validation("invalid month".into()))?;

    let products = product::list_by_company(db, company_id).await?;
    let ratio = pricing::average_margin_ratio(
        products.iter().map(|p| (p.sale_price, p.cost_price)),
        c.default_tax_rate,
        c.default_card_fee,
    );

    let variable_expenses: Decimal = expense::list_for_period(db, company_id, start.into(), end.into())
        .await?
        .iter()
        .map(|e| e.amount)
        .sum();

    let booked = monthly_revenue::find_by_month(db, company_id, month as i16, year)
        .await?
        .map(|r| r.total_revenue)
        .unwrap_or(Decimal::ZERO);

    let target = pricing::calculate_sales_target(&SalesTargetInput {
        fixed_costs: c.monthly_fixed_cost,
        variable_expenses,
        target_profit: c.target_profit_value,
        average_margin_ratio: ratio,
        remaining_days: pricing::remaining_days_in_month(today, year, month),
        booked_revenue: booked,
    });
    Ok(SalesTargetReport { month, year, target })
}
