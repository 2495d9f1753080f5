//! `Json`, `Query` and `Path` extractors that reject with the JSON error
//! envelope instead of axum's plain-text bodies.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::JsonApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(JsonApiError))]
pub struct Json<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(JsonApiError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(JsonApiError))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        JsonApiError::new(r.status(), "Invalid Request Body", Some(r.body_text()))
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        JsonApiError::new(r.status(), "Invalid Query", Some(r.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        JsonApiError::new(r.status(), "Invalid Path", Some(r.body_text()))
    }
}
