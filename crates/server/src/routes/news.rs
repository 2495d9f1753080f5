//! Crypto news, mounted alongside the wallet routes.

use axum::{
    extract::State,
    routing::get,
    Router,
};

use models::crypto_news::{self, NewNews};
use service::news_service::{self, NewsUpdate};
use service::pagination::Pagination;

use super::PublishedFilter;
use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/news", get(list_news).post(create_news))
        .route("/news/:id", get(get_news).put(update_news).delete(delete_news))
}

pub async fn create_news(State(state): State<ServerState>, Json(new): Json<NewNews>) -> ApiResult<crypto_news::Model> {
    Ok(ApiResponse::created("news created", news_service::create_news(&state.db, new).await?))
}

pub async fn list_news(
    State(state): State<ServerState>,
    Query(filter): Query<PublishedFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<crypto_news::Model>> {
    Ok(ApiResponse::ok("news", news_service::list_news(&state.db, filter.published, page).await?))
}

pub async fn get_news(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<crypto_news::Model> {
    let item = news_service::get_news(&state.db, id).await?.ok_or_else(|| JsonApiError::not_found("news"))?;
    Ok(ApiResponse::ok("news", item))
}

pub async fn update_news(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<NewsUpdate>,
) -> ApiResult<crypto_news::Model> {
    Ok(ApiResponse::ok("news updated", news_service::update_news(&state.db, id, patch).await?))
}

pub async fn delete_news(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !news_service::delete_news(&state.db, id).await? {
        return Err(JsonApiError::not_found("news"));
    }
    Ok(ApiResponse::ok("news deleted", ()))
}
