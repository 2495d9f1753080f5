//! Plans and subscriptions under `/api/subscription`.

use axum::{
    extract::State,
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use models::subscription_plan::{self, NewPlan};
use service::ledger::domain::{ExpiryOutcome, Subscription};
use service::ledger::service::SweepReport;
use service::pagination::Pagination;
use service::plan_service::{self, PlanUpdate};

use crate::errors::{ApiResponse, ApiResult, JsonApiError};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub wallet_id: i64,
    pub plan_id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub reinvest: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReinvestRequest {
    pub reinvest: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanFilter {
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WalletFilter {
    pub wallet_id: Option<i64>,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/:id", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/", post(create_subscription).get(list_subscriptions))
        .route("/expire-due", post(expire_due))
        .route("/:id", get(get_subscription))
        .route("/:id/reinvest", patch(set_reinvest))
        .route("/:id/expire", post(expire_subscription))
}

pub async fn create_plan(State(state): State<ServerState>, Json(new): Json<NewPlan>) -> ApiResult<subscription_plan::Model> {
    Ok(ApiResponse::created("plan created", plan_service::create_plan(&state.db, new).await?))
}

pub async fn list_plans(
    State(state): State<ServerState>,
    Query(filter): Query<PlanFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<subscription_plan::Model>> {
    Ok(ApiResponse::ok("plans", plan_service::list_plans(&state.db, filter.active, page).await?))
}

pub async fn get_plan(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<subscription_plan::Model> {
    let plan = plan_service::get_plan(&state.db, id).await?.ok_or_else(|| JsonApiError::not_found("plan"))?;
    Ok(ApiResponse::ok("plan", plan))
}

pub async fn update_plan(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(patch): Json<PlanUpdate>,
) -> ApiResult<subscription_plan::Model> {
    Ok(ApiResponse::ok("plan updated", plan_service::update_plan(&state.db, id, patch).await?))
}

pub async fn delete_plan(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<()> {
    if !plan_service::delete_plan(&state.db, id).await? {
        return Err(JsonApiError::not_found("plan"));
    }
    Ok(ApiResponse::ok("plan deleted", ()))
}

/// Enroll a wallet in a plan
pub async fn create_subscription(State(state): State<ServerState>, Json(req): Json<SubscribeRequest>) -> ApiResult<Subscription> {
    let sub = state.ledger.create_subscription(req.wallet_id, req.plan_id, req.amount, req.reinvest).await?;
    Ok(ApiResponse::created("subscription created", sub))
}

pub async fn list_subscriptions(
    State(state): State<ServerState>,
    Query(filter): Query<WalletFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Subscription>> {
    Ok(ApiResponse::ok("subscriptions", state.ledger.list_subscriptions(filter.wallet_id, page).await?))
}

pub async fn get_subscription(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Subscription> {
    Ok(ApiResponse::ok("subscription", state.ledger.get_subscription(id).await?))
}

pub async fn set_reinvest(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<ReinvestRequest>,
) -> ApiResult<Subscription> {
    Ok(ApiResponse::ok("reinvest updated", state.ledger.set_reinvest(id, req.reinvest).await?))
}

/// Expire one subscription whose end date has passed
pub async fn expire_subscription(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<ExpiryOutcome> {
    let outcome = state.ledger.handle_subscription_expiration(id, Utc::now()).await?;
    Ok(ApiResponse::ok(format!("subscription {}", outcome.expired.status.as_str()), outcome))
}

pub async fn expire_due(State(state): State<ServerState>) -> ApiResult<SweepReport> {
    Ok(ApiResponse::ok("expiry sweep finished", state.ledger.expire_due_subscriptions(Utc::now()).await?))
}
