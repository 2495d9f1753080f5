//! Published deposit showcases.

use axum::{
    extract::State,
    routing::get,
    Router,
};

use models::post_deposit::{self, NewPostDeposit};
use service::pagination::Pagination;
use service::post_deposit_service::{self, PostDepositUpdate};

use super::PublishedFilter;
use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_post_deposits).post(create_post_deposit))
        .route("/:id", get(get_post_deposit).put(update_post_deposit).delete(delete_post_deposit))
}

pub async fn create_post_deposit(
    State(state): State<ServerState>,
    Json(new): Json<NewPostDeposit>,
) -> ApiResult<post_deposit::Model> {
    let created = post_deposit_service::create_post_deposit(&state.db, new).await?;
    Ok(ApiResponse::created("post deposit created", created))
}

pub async fn list_post_deposits(
    State(state): State<ServerState>,
    Query(filter): Query<PublishedFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<post_deposit::Model>> {
    let items = post_deposit_service::list_post_deposits(&state.db, filter.published, page).await?;
    Ok(ApiResponse::ok("post deposits", items))
}

pub async fn get_post_deposit(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<post_deposit::Model> {
    let item = post_deposit_service::get_post_deposit(&state.db, id)
        .await?
        .ok_or_else(|| JsonApiError::not_found("post deposit"))?;
    Ok(ApiResponse::ok("post deposit", item))
}

pub async fn update_post_deposit(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<PostDepositUpdate>,
) -> ApiResult<post_deposit::Model> {
    let updated = post_deposit_service::update_post_deposit(&state.db, id, patch).await?;
    Ok(ApiResponse::ok("post deposit updated", updated))
}

pub async fn delete_post_deposit(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !post_deposit_service::delete_post_deposit(&state.db, id).await? {
        return Err(JsonApiError::not_found("post deposit"));
    }
    Ok(ApiResponse::ok("post deposit deleted", ()))
}
