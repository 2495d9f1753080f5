use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<DbErr> for ModelError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ModelError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ModelError::Validation(msg),
            _ => ModelError::Db(e.to_string()),
        }
    }
}

/// Reject blank required text fields.
pub fn require(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_whitespace() {
        assert!(matches!(require("title", "  "), Err(ModelError::Validation(m)) if m == "title required"));
        assert!(require("title", "x").is_ok());
    }

    #[test]
    fn plain_db_errors_stay_db() {
        let e: ModelError = DbErr::Custom("boom".into()).into();
        assert!(matches!(e, ModelError::Db(_)));
    }
}
