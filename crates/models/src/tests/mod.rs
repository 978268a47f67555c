use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

/// CRUD operations tests for the finance entities
pub mod crud_tests;

/// Transaction handling and revenue upsert tests
pub mod transaction_tests;

/// Connect and migrate, or `None` when the database is unavailable.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match crate::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}
