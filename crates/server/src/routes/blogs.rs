use axum::{
    extract::State,
    routing::get,
    Router,
};

use models::blog_post::{self, NewBlogPost};
use service::blog_service::{self, BlogUpdate};
use service::pagination::Pagination;

use super::StatusFilter;
use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/slug/:slug", get(get_post_by_slug))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

pub async fn create_post(State(state): State<ServerState>, Json(new): Json<NewBlogPost>) -> ApiResult<blog_post::Model> {
    Ok(ApiResponse::created("blog post created", blog_service::create_post(&state.db, new).await?))
}

pub async fn list_posts(
    State(state): State<ServerState>,
    Query(filter): Query<StatusFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<blog_post::Model>> {
    let posts = blog_service::list_posts(&state.db, filter.status.as_deref(), page).await?;
    Ok(ApiResponse::ok("blog posts", posts))
}

/// Fetch by id; counts as a view
pub async fn get_post(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<blog_post::Model> {
    let post = blog_service::get_post(&state.db, id).await?.ok_or_else(|| JsonApiError::not_found("blog post"))?;
    Ok(ApiResponse::ok("blog post", post))
}

pub async fn get_post_by_slug(State(state): State<ServerState>, Path(slug): Path<String>) -> ApiResult<blog_post::Model> {
    let post = blog_service::get_post_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| JsonApiError::not_found("blog post"))?;
    Ok(ApiResponse::ok("blog post", post))
}

pub async fn update_post(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<BlogUpdate>,
) -> ApiResult<blog_post::Model> {
    Ok(ApiResponse::ok("blog post updated", blog_service::update_post(&state.db, id, patch).await?))
}

pub async fn delete_post(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !blog_service::delete_post(&state.db, id).await? {
        return Err(JsonApiError::not_found("blog post"));
    }
    Ok(ApiResponse::ok("blog post deleted", ()))
}
