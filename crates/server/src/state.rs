use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::ledger::{LedgerRepository, LedgerService};

pub type Ledger = LedgerService<dyn LedgerRepository>;

/// Shared handler state. CRUD handlers use `db` directly; every
/// balance-affecting route goes through `ledger`.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub ledger: Arc<Ledger>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, repo: Arc<dyn LedgerRepository>) -> Self {
        Self { db, ledger: Arc::new(LedgerService::new(repo)) }
    }
}
