use axum::{
    extract::State,
    routing::get,
    Router,
};

use models::testimonial::{self, NewTestimonial};
use service::pagination::Pagination;
use service::testimonial_service::{self, TestimonialUpdate};

use super::PublishedFilter;
use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_testimonials).post(create_testimonial))
        .route("/:id", get(get_testimonial).put(update_testimonial).delete(delete_testimonial))
}

pub async fn create_testimonial(
    State(state): State<ServerState>,
    Json(new): Json<NewTestimonial>,
) -> ApiResult<testimonial::Model> {
    let created = testimonial_service::create_testimonial(&state.db, new).await?;
    Ok(ApiResponse::created("testimonial created", created))
}

pub async fn list_testimonials(
    State(state): State<ServerState>,
    Query(filter): Query<PublishedFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<testimonial::Model>> {
    let items = testimonial_service::list_testimonials(&state.db, filter.published, page).await?;
    Ok(ApiResponse::ok("testimonials", items))
}

pub async fn get_testimonial(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<testimonial::Model> {
    let item = testimonial_service::get_testimonial(&state.db, id)
        .await?
        .ok_or_else(|| JsonApiError::not_found("testimonial"))?;
    Ok(ApiResponse::ok("testimonial", item))
}

pub async fn update_testimonial(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<TestimonialUpdate>,
) -> ApiResult<testimonial::Model> {
    let updated = testimonial_service::update_testimonial(&state.db, id, patch).await?;
    Ok(ApiResponse::ok("testimonial updated", updated))
}

pub async fn delete_testimonial(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !testimonial_service::delete_testimonial(&state.db, id).await? {
        return Err(JsonApiError::not_found("testimonial"));
    }
    Ok(ApiResponse::ok("testimonial deleted", ()))
}
