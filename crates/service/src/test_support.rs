#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> Option<DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let mut cfg = DatabaseConfig::from_env();
    if cfg.url.trim().is_empty() {
        return None;
    }
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.connect_timeout_secs = 5;
    cfg.acquire_timeout_secs = 10;
    Some(cfg)
}

/// A migrated database, or `None` when `DATABASE_URL` is unset or
/// `SKIP_DB_TESTS` is set. Callers return early on `None`.
pub async fn get_db() -> Option<DatabaseConnection> {
    let cfg = test_config()?;
    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&cfg).await else {
                eprintln!("skip: cannot connect to db");
                return false;
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {e}");
                return false;
            }
            true
        })
        .await;
    if !migrated {
        return None;
    }
    // Return a fresh connection for the current test's runtime
    connect_with_config(&cfg).await.ok()
}
