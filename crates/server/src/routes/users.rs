use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use models::user;
use service::pagination::Pagination;
use service::user_service::{self, AdminUpdate, ProfileUpdate, RegisterInput, UserFilter};

use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/register", post(register))
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_profile).patch(admin_update).delete(delete_user),
        )
        .route("/users/:id/password", put(change_password))
}

/// Register a new account
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<user::Model> {
    let created = user_service::register(&state.db, input).await?;
    info!(user_id = created.id, "register ok");
    Ok(ApiResponse::created("user registered", created))
}

pub async fn list_users(
    State(state): State<ServerState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<user::Model>> {
    let users = user_service::list_users(&state.db, &filter, page).await?;
    Ok(ApiResponse::ok("users", users))
}

pub async fn get_user(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<user::Model> {
    let found = user_service::get_user(&state.db, id).await?.ok_or_else(|| JsonApiError::not_found("user"))?;
    Ok(ApiResponse::ok("user", found))
}

pub async fn update_profile(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<ProfileUpdate>,
) -> ApiResult<user::Model> {
    let updated = user_service::update_profile(&state.db, id, patch).await?;
    Ok(ApiResponse::ok("profile updated", updated))
}

/// Change role or account status
pub async fn admin_update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<AdminUpdate>,
) -> ApiResult<user::Model> {
    let updated = user_service::admin_update(&state.db, id, patch).await?;
    Ok(ApiResponse::ok("user updated", updated))
}

pub async fn change_password(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    user_service::change_password(&state.db, id, &req.current_password, &req.new_password).await?;
    Ok(ApiResponse::ok("password changed", ()))
}

pub async fn delete_user(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !user_service::delete_user(&state.db, id).await? {
        return Err(JsonApiError::not_found("user"));
    }
    Ok(ApiResponse::ok("user deleted", ()))
}
