use sea_orm::{entity::prelude::*, sea_query::{Expr, OnConflict}, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{company, errors};

/// Aggregated revenue, one row per (company, month, year).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_revenue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub total_revenue: Decimal,
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

pub fn validate_month(month: i16) -> Result<(), errors::ModelError> {
    if !(1..=12).contains(&month) {
        return Err(errors::ModelError::Validation("month must be between 1 and 12".into()));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), errors::ModelError> {
    if !(2000..=2100).contains(&year) {
        return Err(errors::ModelError::Validation("year must be between 2000 and 2100".into()));
    }
    Ok(())
}

pub async fn find_by_month<C: ConnectionTrait>(db: &C, company_id: Uuid, month: i16, year: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CompanyId.eq(company_id))
        .filter(Column::Month.eq(month))
        .filter(Column::Year.eq(year))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_for_company<C: ConnectionTrait>(db: &C, company_id: Uuid, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .filter(Column::CompanyId.eq(company_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Newest month first; optionally restricted to one year.
pub async fn list_by_company<C: ConnectionTrait>(db: &C, company_id: Uuid, year: Option<i32>) -> Result<Vec<Model>, errors::ModelError> {
    let mut q = Entity::find().filter(Column::CompanyId.eq(company_id));
    if let Some(y) = year {
        q = q.filter(Column::Year.eq(y));
    }
    q.order_by_desc(Column::Year)
        .order_by_desc(Column::Month)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Add `amount` to the month's revenue, creating the row on first use.
///
/// Single `INSERT ... ON CONFLICT (company_id, month, year) DO UPDATE` so
/// concurrent sales of the same month never create a second row.
pub async fn add_to_month<C: ConnectionTrait>(
    db: &C,
    company_id: Uuid,
    month: i16,
    year: i32,
    amount: Decimal,
) -> Result<(), errors::ModelError> {
    validate_month(month)?;
    validate_year(year)?;
    let now = Utc::now();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        month: Set(month),
        year: Set(year),
        total_revenue: Set(amount),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    Entity::insert(am)
        .on_conflict(
            OnConflict::columns([Column::CompanyId, Column::Month, Column::Year])
                .value(
                    Column::TotalRevenue,
                    Expr::col((Entity, Column::TotalRevenue)).add(amount),
                )
                .value(Column::UpdatedAt, Expr::value(now))
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}
