/// CRUD round trips against PostgreSQL for every entity
pub mod crud_tests;

/// Schema constraints enforced by the migrations
pub mod constraint_tests;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Connect and migrate, or `None` when no database is configured.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
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

pub(crate) async fn new_user(db: &DatabaseConnection) -> anyhow::Result<crate::user::Model> {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let u = crate::user::create(
        db,
        crate::user::NewUser {
            username: format!("u_{}", &tag[..12]),
            email: format!("{}@example.com", tag),
            password_hash: "x".into(),
            full_name: "Test User".into(),
            phone: None,
            country: Some("NG".into()),
        },
    )
    .await?;
    Ok(u)
}
