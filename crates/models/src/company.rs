use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors;

/// Tenant root. Percentages (`default_tax_rate`, `default_card_fee`,
/// `desired_margin`) are stored as 0..=100.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub monthly_fixed_cost: Decimal,
    pub default_tax_rate: Decimal,
    pub default_card_fee: Decimal,
    pub desired_margin: Decimal,
    pub target_profit_value: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::has_many(crate::user::Entity).into(),
            Relation::Product => Entity::has_many(crate::product::Entity).into(),
        }
    }
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<crate::product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let t = name.trim();
    if t.is_empty() { return Err(errors::ModelError::Validation("company name required".into())); }
    if t.len() > 128 { return Err(errors::ModelError::Validation("company name too long".into())); }
    Ok(())
}

/// Percent fields accept 0..=100.
pub fn validate_percent(field: &str, v: Decimal) -> Result<(), errors::ModelError> {
    if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED {
        return Err(errors::ModelError::Validation(format!("{field} must be between 0 and 100")));
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, v: Decimal) -> Result<(), errors::ModelError> {
    if v < Decimal::ZERO {
        return Err(errors::ModelError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Create a company with zeroed financial settings.
pub async fn create<C: ConnectionTrait>(db: &C, name: &str) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        monthly_fixed_cost: Set(Decimal::ZERO),
        default_tax_rate: Set(Decimal::ZERO),
        default_card_fee: Set(Decimal::ZERO),
        desired_margin: Set(Decimal::ZERO),
        target_profit_value: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
