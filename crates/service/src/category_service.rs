use sea_orm::{DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, ColumnTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{category, product};
use crate::errors::ServiceError;

/// Create a category; names are unique within a company.
#[instrument(skip(db), fields(company_id = %company_id))]
pub async fn create_category(db: &DatabaseConnection, company_id: Uuid, name: &str) -> Result<category::Model, ServiceError> {
    category::validate_name(name)?;
    if category::find_by_name(db, company_id, name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("category '{}' already exists", name.trim())));
    }
    let created = category::create(db, company_id, name).await?;
    info!(category_id = %created.id, "category_created");
    Ok(created)
}

pub async fn list_categories(db: &DatabaseConnection, company_id: Uuid) -> Result<Vec<category::Model>, ServiceError> {
    Ok(category::list_by_company(db, company_id).await?)
}

pub async fn get_category(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<category::Model, ServiceError> {
    category::Entity::find_by_id(id)
        .filter(category::Column::CompanyId.eq(company_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("category"))
}

/// Delete a category that no product uses.
#[instrument(skip(db), fields(company_id = %company_id))]
pub async fn delete_category(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let found = get_category(db, company_id, id).await?;
    let in_use = product::count_in_category(db, id).await?;
    if in_use > 0 {
        return Err(ServiceError::Conflict(format!("category is used by {in_use} product(s)")));
    }
    found.delete(db).await.map_err(ServiceError::db)?;
    info!(category_id = %id, "category_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{drop_company, get_db, new_company};

    #[tokio::test]
    async fn category_crud_service() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let c = new_company(&db).await;

        let cat = create_category(&db, c.id, "Drinks").await?;
        assert!(matches!(create_category(&db, c.id, "Drinks").await, Err(ServiceError::Conflict(_))));
        assert!(matches!(create_category(&db, c.id, "  ").await, Err(ServiceError::Model(_))));

        let list = list_categories(&db, c.id).await?;
        assert_eq!(list.len(), 1);

        // other companies cannot see it
        let other = new_company(&db).await;
        assert!(matches!(get_category(&db, other.id, cat.id).await, Err(ServiceError::NotFound(_))));

        delete_category(&db, c.id, cat.id).await?;
        assert!(list_categories(&db, c.id).await?.is_empty());

        drop_company(&db, c.id).await;
        drop_company(&db, other.id).await;
        Ok(())
    }
}
