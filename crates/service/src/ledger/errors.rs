use thiserror::Error;

/// Business errors for wallet ledger workflows
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("wallet not found")]
    WalletNotFound,
    #[error("insufficient balance or wallet not found")]
    InsufficientBalance,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} not found or already processed")]
    NotFoundOrProcessed(&'static str),
    #[error("subscription has not reached its end date")]
    NotExpired,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl LedgerError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            LedgerError::Validation(_) => 2001,
            LedgerError::WalletNotFound => 2002,
            LedgerError::InsufficientBalance => 2003,
            LedgerError::NotFound(_) => 2004,
            LedgerError::NotFoundOrProcessed(_) => 2005,
            LedgerError::NotExpired => 2006,
            LedgerError::Conflict(_) => 2007,
            LedgerError::Repository(_) => 2100,
        }
    }
}

impl From<models::errors::ModelError> for LedgerError {
    fn from(e: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match e {
            ModelError::Validation(m) => LedgerError::Validation(m),
            ModelError::Conflict(m) => LedgerError::Conflict(m),
            ModelError::Db(m) => LedgerError::Repository(m),
        }
    }
}
