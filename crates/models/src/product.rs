use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder};
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{category, company, errors};

pub const DEFAULT_UNIT: &str = "un";

/// Product priced by the smart-pricing rules; `markup` is a percentage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub markup: Decimal,
    pub stock: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Company, Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
        }
    }
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef { Relation::Company.def() }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let t = name.trim();
    if t.is_empty() { return Err(errors::ModelError::Validation("product name required".into())); }
    if t.len() > 128 { return Err(errors::ModelError::Validation("product name too long".into())); }
    Ok(())
}

pub fn validate_unit(unit: &str) -> Result<(), errors::ModelError> {
    let t = unit.trim();
    if t.is_empty() || t.len() > 16 {
        return Err(errors::ModelError::Validation("unit must have 1 to 16 characters".into()));
    }
    Ok(())
}

pub fn validate_amount(field: &str, v: Decimal) -> Result<(), errors::ModelError> {
    if v < Decimal::ZERO {
        return Err(errors::ModelError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Product scoped to its company; other tenants' rows are invisible.
pub async fn find_for_company<C: ConnectionTrait>(db: &C, company_id: Uuid, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .filter(Column::CompanyId.eq(company_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_by_company<C: ConnectionTrait>(db: &C, company_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CompanyId.eq(company_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn count_in_category<C: ConnectionTrait>(db: &C, category_id: Uuid) -> Result<u64, errors::ModelError> {
    Entity::find()
        .filter(Column::CategoryId.eq(category_id))
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
