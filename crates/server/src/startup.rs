use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use service::ledger::repo::seaorm::SeaOrmLedgerRepository;
use service::ledger::sweeper::spawn_expiry_sweeper;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

async fn connect(cfg: &AppConfig) -> Result<DatabaseConnection, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.ledger.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migrations: {e}")))?;
        info!("migrations applied");
    }
    Ok(db)
}

/// Wire the PostgreSQL ledger into handler state
pub fn build_state(db: DatabaseConnection) -> ServerState {
    let repo = Arc::new(SeaOrmLedgerRepository::new(db.clone()));
    ServerState::new(db, repo)
}

/// Application router with the default CORS policy
pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Load configuration from `config.toml` or the environment and serve.
pub async fn run() -> Result<(), StartupError> {
    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> Result<(), StartupError> {
    let addr = bind_addr(&cfg)?;
    let db = connect(&cfg).await?;
    let state = build_state(db);

    let _sweeper = if cfg.ledger.expiry_sweep_secs > 0 {
        info!(every_secs = cfg.ledger.expiry_sweep_secs, "subscription expiry sweeper enabled");
        Some(spawn_expiry_sweeper(
            Arc::clone(&state.ledger),
            Duration::from_secs(cfg.ledger.expiry_sweep_secs),
        ))
    } else {
        warn!("subscription expiry sweeper disabled");
        None
    };

    let _admin = match cfg.server.admin_addr.as_deref() {
        Some(admin) => Some(common::admin_http::spawn_admin_server(admin, common::metrics::encode_metrics).await?),
        None => None,
    };

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, "http server listening");
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
