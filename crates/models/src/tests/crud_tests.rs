use super::setup_test_db;
use crate::{category, company, expense, product, user, user_credentials};
use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

/// Company -> user -> credentials, then cascade on company delete
#[tokio::test]
async fn test_company_user_crud() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = company::create(&db, &format!("crud_company_{}", Uuid::new_v4())).await?;
    assert_eq!(c.monthly_fixed_cost, Decimal::ZERO);

    let email = format!("Crud_{}@Example.com", Uuid::new_v4());
    let u = user::create(&db, c.id, &email, "Crud User").await?;
    assert_eq!(u.email, email.to_lowercase());
    assert_eq!(u.company_id, c.id);

    let found = user::find_by_email(&db, &email).await?;
    assert_eq!(found.map(|f| f.id), Some(u.id));

    let cred = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let again = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(cred.id, again.id);
    assert_eq!(again.password_hash, "hash-2");

    company::Entity::delete_by_id(c.id).exec(&db).await?;
    assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());
    Ok(())
}

/// Category names are unique per company
#[tokio::test]
async fn test_category_unique_per_company() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let a = company::create(&db, "cat_company_a").await?;
    let b = company::create(&db, "cat_company_b").await?;

    category::create(&db, a.id, "Drinks").await?;
    assert!(category::create(&db, a.id, "Drinks").await.is_err());
    category::create(&db, b.id, "Drinks").await?;

    let list = category::list_by_company(&db, a.id).await?;
    assert_eq!(list.len(), 1);
    assert!(category::find_by_name(&db, b.id, " Drinks ").await?.is_some());

    company::Entity::delete_by_id(a.id).exec(&db).await?;
    company::Entity::delete_by_id(b.id).exec(&db).await?;
    Ok(())
}

/// Products are only visible to their own company
#[tokio::test]
async fn test_product_company_scope() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = company::create(&db, "product_company").await?;
    let other = company::create(&db, "product_other").await?;
    let cat = category::create(&db, c.id, "General").await?;
    let now = Utc::now();
    let p = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(c.id),
        category_id: Set(cat.id),
        name: Set("Coffee".into()),
        description: Set(None),
        unit: Set(product::DEFAULT_UNIT.into()),
        cost_price: Set(Decimal::new(500, 2)),
        sale_price: Set(Decimal::new(1000, 2)),
        markup: Set(Decimal::new(10000, 2)),
        stock: Set(Decimal::from(10)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;

    assert!(product::find_for_company(&db, c.id, p.id).await?.is_some());
    assert!(product::find_for_company(&db, other.id, p.id).await?.is_none());
    assert_eq!(product::count_in_category(&db, cat.id).await?, 1);

    company::Entity::delete_by_id(c.id).exec(&db).await?;
    company::Entity::delete_by_id(other.id).exec(&db).await?;
    Ok(())
}

/// Recurring expenses count for every month; others only in their due month
#[tokio::test]
async fn test_expense_period_query() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let c = company::create(&db, "expense_company").await?;
    let mk = |desc: &str, due: chrono::DateTime<Utc>, recurring: bool| expense::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(c.id),
        description: Set(desc.into()),
        amount: Set(Decimal::from(100)),
        due_date: Set(due.into()),
        paid_at: Set(None),
        status: Set(expense::ExpenseStatus::Pending),
        category: Set(expense::ExpenseCategory::Variable),
        is_recurring: Set(recurring),
        installment_number: Set(1),
        installment_count: Set(1),
        installment_group_id: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };
    let at = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap().and_utc();

    mk("in march", at(2024, 3, 15), false).insert(&db).await?;
    mk("in april", at(2024, 4, 1), false).insert(&db).await?;
    mk("rent", at(2023, 1, 5), true).insert(&db).await?;

    let rows = expense::list_for_period(&db, c.id, at(2024, 3, 1).into(), at(2024, 4, 1).into()).await?;
    let names: Vec<_> = rows.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, vec!["rent", "in march"]);

    company::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}
