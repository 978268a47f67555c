use sea_orm::entity::prelude::*;
use uuid::Uuid;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{product, sale};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub sub_total: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Sale, Product }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Sale => Entity::belongs_to(sale::Entity)
                .from(Column::SaleId)
                .to(sale::Column::Id)
                .into(),
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
        }
    }
}

impl Related<sale::Entity> for Entity {
    fn to() -> RelationDef { Relation::Sale.def() }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}
