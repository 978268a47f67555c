use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder};
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{company, errors, sale_item};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleType {
    /// Line items with stock decrement
    #[sea_orm(string_value = "ITEMIZED")]
    Itemized,
    /// A single amount for the day, no items
    #[sea_orm(string_value = "DAILY_TOTAL")]
    DailyTotal,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub date: DateTimeWithTimeZone,
    pub total_amount: Decimal,
    pub sale_type: SaleType,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Company, Items }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
            Relation::Items => Entity::has_many(sale_item::Entity).into(),
        }
    }
}

impl Related<sale_item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Items.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Sales of a company inside `[start, end)`, newest first. No bounds lists everything.
pub async fn list_in_range<C: ConnectionTrait>(
    db: &C,
    company_id: Uuid,
    range: Option<(DateTimeWithTimeZone, DateTimeWithTimeZone)>,
) -> Result<Vec<Model>, errors::ModelError> {
    let mut q = Entity::find().filter(Column::CompanyId.eq(company_id));
    if let Some((start, end)) = range {
        q = q.filter(Column::Date.gte(start)).filter(Column::Date.lt(end));
    }
    q.order_by_desc(Column::Date)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
