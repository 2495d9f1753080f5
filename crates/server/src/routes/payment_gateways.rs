use axum::{
    extract::State,
    routing::get,
    Router,
};

use models::payment_gateway::{self, NewGateway};
use service::pagination::Pagination;
use service::payment_gateway_service::{self, GatewayUpdate};

use super::StatusFilter;
use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/payment-gateways", get(list_gateways).post(create_gateway))
        .route(
            "/payment-gateways/:id",
            get(get_gateway).put(update_gateway).delete(delete_gateway),
        )
}

pub async fn create_gateway(
    State(state): State<ServerState>,
    Json(new): Json<NewGateway>,
) -> ApiResult<payment_gateway::Model> {
    let created = payment_gateway_service::create_gateway(&state.db, new).await?;
    Ok(ApiResponse::created("payment gateway created", created))
}

pub async fn list_gateways(
    State(state): State<ServerState>,
    Query(filter): Query<StatusFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<payment_gateway::Model>> {
    let items = payment_gateway_service::list_gateways(&state.db, filter.status.as_deref(), page).await?;
    Ok(ApiResponse::ok("payment gateways", items))
}

pub async fn get_gateway(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<payment_gateway::Model> {
    let item = payment_gateway_service::get_gateway(&state.db, id)
        .await?
        .ok_or_else(|| JsonApiError::not_found("payment gateway"))?;
    Ok(ApiResponse::ok("payment gateway", item))
}

pub async fn update_gateway(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<GatewayUpdate>,
) -> ApiResult<payment_gateway::Model> {
    let updated = payment_gateway_service::update_gateway(&state.db, id, patch).await?;
    Ok(ApiResponse::ok("payment gateway updated", updated))
}

pub async fn delete_gateway(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !payment_gateway_service::delete_gateway(&state.db, id).await? {
        return Err(JsonApiError::not_found("payment gateway"));
    }
    Ok(ApiResponse::ok("payment gateway deleted", ()))
}
