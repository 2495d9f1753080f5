use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;
use service::ledger::LedgerError;

/// Successful response: `{ success: true, message, data }`.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self { status: StatusCode::OK, message: message.into(), data }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self { status: StatusCode::CREATED, message: message.into(), data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "success": true, "message": self.message, "data": self.data });
        (self.status, Json(body)).into_response()
    }
}

/// Failed response: `{ success: false, message, error }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, error: Option<String>) -> Self {
        Self { status, message: message.into(), error }
    }

    pub fn not_found(entity: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("{entity} not found")))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, error = ?self.error, "request failed");
        }
        let body = serde_json::json!({ "success": false, "message": self.message, "error": self.error });
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, JsonApiError>;

impl From<LedgerError> for JsonApiError {
    fn from(e: LedgerError) -> Self {
        let (status, message) = match &e {
            LedgerError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            LedgerError::WalletNotFound | LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            LedgerError::NotFoundOrProcessed(_) | LedgerError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            LedgerError::InsufficientBalance | LedgerError::NotExpired => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Unprocessable Entity")
            }
            LedgerError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        JsonApiError::new(status, message, Some(e.to_string()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Conflict(msg) => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(msg)),
            _ => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
