use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{company, errors};

/// Name given to the category every company starts with.
pub const DEFAULT_CATEGORY_NAME: &str = "General";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Company, Product }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
            Relation::Product => Entity::has_many(crate::product::Entity).into(),
        }
    }
}

impl Related<crate::product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let t = name.trim();
    if t.is_empty() { return Err(errors::ModelError::Validation("category name required".into())); }
    if t.len() > 128 { return Err(errors::ModelError::Validation("category name too long".into())); }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, company_id: Uuid, name: &str) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(name.trim().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_name<C: ConnectionTrait>(db: &C, company_id: Uuid, name: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CompanyId.eq(company_id))
        .filter(Column::Name.eq(name.trim()))
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
