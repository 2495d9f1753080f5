//! Wallet ledger routes under `/api/crypto`.

use axum::{
    extract::State,
    routing::{get, patch, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use service::ledger::domain::{Payout, PayoutFilter, Subscription, Transaction, TransactionFilter, Wallet};
use service::pagination::Pagination;

use crate::errors::{ApiResponse, ApiResult};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LedgerRequest {
    pub wallet_id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayoutRequest {
    pub wallet_id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EarningsRequest {
    pub subscription_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SettledTransaction {
    pub transaction: Transaction,
    pub wallet: Wallet,
}

#[derive(Debug, Serialize)]
pub struct SettledPayout {
    pub payout: Payout,
    pub wallet: Wallet,
}

#[derive(Debug, Serialize)]
pub struct Accrued {
    pub subscription: Subscription,
    pub transaction: Transaction,
}

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/wallets", post(create_wallet))
        .route("/wallets/:id", get(get_wallet))
        .route("/wallets/user/:user_id", get(get_wallet_by_user))
        .route("/deposits", post(deposit))
        .route("/deposits/:id/status", patch(update_deposit_status))
        .route("/withdrawals", post(request_withdrawal))
        .route("/withdrawals/:id/status", patch(update_withdrawal_status))
        .route("/transactions", get(list_transactions))
        .route("/transactions/:id", get(get_transaction))
        .route("/payouts", post(request_payout).get(list_payouts))
        .route("/payouts/:id", get(get_payout))
        .route("/payouts/:id/status", patch(update_payout_status))
        .route("/earnings", post(add_earnings))
}

pub async fn create_wallet(State(state): State<ServerState>, Json(req): Json<CreateWalletRequest>) -> ApiResult<Wallet> {
    let wallet = state.ledger.create_wallet(req.user_id).await?;
    Ok(ApiResponse::created("wallet created", wallet))
}

pub async fn get_wallet(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Wallet> {
    Ok(ApiResponse::ok("wallet", state.ledger.get_wallet(id).await?))
}

pub async fn get_wallet_by_user(State(state): State<ServerState>, Path(user_id): Path<i64>) -> ApiResult<Wallet> {
    Ok(ApiResponse::ok("wallet", state.ledger.get_wallet_by_user(user_id).await?))
}

/// Record a pending deposit
pub async fn deposit(State(state): State<ServerState>, Json(req): Json<LedgerRequest>) -> ApiResult<Transaction> {
    let tx = state.ledger.deposit(req.wallet_id, req.amount, req.reference).await?;
    Ok(ApiResponse::created("deposit request submitted", tx))
}

/// Accept or reject a pending deposit
pub async fn update_deposit_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusUpdate>,
) -> ApiResult<SettledTransaction> {
    let (transaction, wallet) = state.ledger.update_deposit_status(id, &req.status).await?;
    Ok(ApiResponse::ok(format!("deposit {}", transaction.status), SettledTransaction { transaction, wallet }))
}

pub async fn request_withdrawal(State(state): State<ServerState>, Json(req): Json<LedgerRequest>) -> ApiResult<Transaction> {
    let tx = state.ledger.request_withdrawal(req.wallet_id, req.amount, req.reference).await?;
    Ok(ApiResponse::created("withdrawal request submitted", tx))
}

pub async fn update_withdrawal_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusUpdate>,
) -> ApiResult<SettledTransaction> {
    let (transaction, wallet) = state.ledger.update_withdrawal_status(id, &req.status).await?;
    Ok(ApiResponse::ok(format!("withdrawal {}", transaction.status), SettledTransaction { transaction, wallet }))
}

pub async fn list_transactions(
    State(state): State<ServerState>,
    Query(filter): Query<TransactionFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Transaction>> {
    Ok(ApiResponse::ok("transactions", state.ledger.list_transactions(&filter, page).await?))
}

pub async fn get_transaction(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Transaction> {
    Ok(ApiResponse::ok("transaction", state.ledger.get_transaction(id).await?))
}

pub async fn request_payout(State(state): State<ServerState>, Json(req): Json<PayoutRequest>) -> ApiResult<Payout> {
    let p = state.ledger.request_payout(req.wallet_id, req.amount, req.destination).await?;
    Ok(ApiResponse::created("payout request submitted", p))
}

pub async fn list_payouts(
    State(state): State<ServerState>,
    Query(filter): Query<PayoutFilter>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Payout>> {
    Ok(ApiResponse::ok("payouts", state.ledger.list_payouts(&filter, page).await?))
}

pub async fn get_payout(State(state): State<ServerState>, Path(id): Path<i64>) -> ApiResult<Payout> {
    Ok(ApiResponse::ok("payout", state.ledger.get_payout(id).await?))
}

pub async fn update_payout_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusUpdate>,
) -> ApiResult<SettledPayout> {
    let (payout, wallet) = state.ledger.update_payout_status(id, &req.status).await?;
    Ok(ApiResponse::ok(format!("payout {}", payout.status), SettledPayout { payout, wallet }))
}

/// Accrue earnings on an active subscription
pub async fn add_earnings(State(state): State<ServerState>, Json(req): Json<EarningsRequest>) -> ApiResult<Accrued> {
    let (subscription, transaction) = state.ledger.add_earnings(req.subscription_id, req.amount).await?;
    Ok(ApiResponse::created("earnings added", Accrued { subscription, transaction }))
}
