use sea_orm::{entity::prelude::*, ConnectionTrait, Condition, QueryOrder};
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{company, errors};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PAID")]
    Paid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "FIXED")]
    Fixed,
    #[sea_orm(string_value = "VARIABLE")]
    Variable,
    #[sea_orm(string_value = "DEBT")]
    Debt,
    #[sea_orm(string_value = "INVESTMENT")]
    Investment,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub due_date: DateTimeWithTimeZone,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub status: ExpenseStatus,
    pub category: ExpenseCategory,
    pub is_recurring: bool,
    pub installment_number: i32,
    pub installment_count: i32,
    pub installment_group_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Company }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_description(d: &str) -> Result<(), errors::ModelError> {
    let t = d.trim();
    if t.is_empty() { return Err(errors::ModelError::Validation("description is required".into())); }
    if t.len() > 255 { return Err(errors::ModelError::Validation("description too long".into())); }
    Ok(())
}

pub fn validate_amount(v: Decimal) -> Result<(), errors::ModelError> {
    if v <= Decimal::ZERO {
        return Err(errors::ModelError::Validation("amount must be positive".into()));
    }
    Ok(())
}

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
        .order_by_asc(Column::DueDate)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Expenses that weigh on a month: recurring ones plus those due in `[start, end)`.
pub async fn list_for_period<C: ConnectionTrait>(
    db: &C,
    company_id: Uuid,
    start: DateTimeWithTimeZone,
    end: DateTimeWithTimeZone,
) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CompanyId.eq(company_id))
        .filter(
            Condition::any()
                .add(Column::IsRecurring.eq(true))
                .add(
                    Condition::all()
                        .add(Column::DueDate.gte(start))
                        .add(Column::DueDate.lt(end)),
                ),
        )
        .order_by_asc(Column::DueDate)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
