use super::setup_test_db;
use crate::{company, monthly_revenue};
use anyhow::Result;
use rust_decimal::Decimal;
use sea_orm::{EntityTrait, TransactionTrait};

/// Two upserts for the same month accumulate into a single row
#[tokio::test]
async fn test_revenue_upsert_accumulates() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = company::create(&db, "upsert_company").await?;
    monthly_revenue::add_to_month(&db, c.id, 5, 2024, Decimal::new(15050, 2)).await?;
    monthly_revenue::add_to_month(&db, c.id, 5, 2024, Decimal::new(4950, 2)).await?;
    monthly_revenue::add_to_month(&db, c.id, 6, 2024, Decimal::from(10)).await?;

    let rows = monthly_revenue::list_by_company(&db, c.id, Some(2024)).await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].month, 6);
    let may = monthly_revenue::find_by_month(&db, c.id, 5, 2024).await?.expect("may row");
    assert_eq!(may.total_revenue, Decimal::from(200));

    company::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}

/// A rolled back upsert leaves no revenue behind
#[tokio::test]
async fn test_revenue_upsert_rollback() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = company::create(&db, "rollback_company").await?;
    let txn = db.begin().await?;
    monthly_revenue::add_to_month(&txn, c.id, 1, 2025, Decimal::from(99)).await?;
    txn.rollback().await?;

    assert!(monthly_revenue::find_by_month(&db, c.id, 1, 2025).await?.is_none());

    company::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}

#[test]
fn month_and_year_bounds() {
    assert!(monthly_revenue::validate_month(0).is_err());
    assert!(monthly_revenue::validate_month(12).is_ok());
    assert!(monthly_revenue::validate_year(1999).is_err());
    assert!(monthly_revenue::validate_year(2100).is_ok());
}

/// Rejected before any statement is sent
#[tokio::test]
async fn test_revenue_upsert_rejects_year_out_of_range() {
    let db = sea_orm::DatabaseConnection::Disconnected;
    let res = monthly_revenue::add_to_month(&db, uuid::Uuid::new_v4(), 5, 1999, Decimal::ONE).await;
    assert!(matches!(res, Err(crate::errors::ModelError::Validation(_))));
}
