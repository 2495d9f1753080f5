//! Router-level tests backed by the in-memory ledger repository.
//! No database: CRUD routes are not exercised here.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::state::ServerState;
use service::ledger::repository::mock::MockLedgerRepository;

const USER: i64 = 7;

fn app() -> (Router, Arc<MockLedgerRepository>) {
    let repo = Arc::new(MockLedgerRepository::default());
    repo.seed_user(USER);
    let state = ServerState::new(DatabaseConnection::Disconnected, repo.clone());
    (server::startup::build_app(state), repo)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn money(v: &Value) -> Decimal {
    match v {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

async fn wallet(app: &Router) -> i64 {
    let (status, body) = call(app, Method::POST, "/api/crypto/wallets", Some(json!({ "user_id": USER }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn funded_wallet(app: &Router, amount: &str) -> i64 {
    let wallet_id = wallet(app).await;
    let (_, body) = call(
        app,
        Method::POST,
        "/api/crypto/deposits",
        Some(json!({ "wallet_id": wallet_id, "amount": amount })),
    )
    .await;
    let tx = body["data"]["id"].as_i64().unwrap();
    let (status, _) = call(
        app,
        Method::PATCH,
        &format!("/api/crypto/deposits/{tx}/status"),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    wallet_id
}

#[tokio::test]
async fn health_reports_database_down_without_connection() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn unknown_route_gets_json_404() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_requests_use_the_error_envelope() {
    let (app, _) = app();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/crypto/deposits")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, Method::POST, "/api/crypto/deposits", Some(json!({ "wallet_id": "one" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (status, body) = call(&app, Method::GET, "/api/crypto/transactions?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = call(&app, Method::GET, "/api/crypto/wallets/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn second_wallet_for_same_user_conflicts() {
    let (app, _) = app();
    wallet(&app).await;
    let (status, body) = call(&app, Method::POST, "/api/crypto/wallets", Some(json!({ "user_id": USER }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::POST, "/api/crypto/wallets", Some(json!({ "user_id": 999 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wallet_lookup_by_id_and_user() {
    let (app, _) = app();
    let id = wallet(&app).await;
    let (status, body) = call(&app, Method::GET, &format!("/api/crypto/wallets/user/{USER}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64(), Some(id));
    assert_eq!(money(&body["data"]["balance"]), Decimal::ZERO);

    let (status, _) = call(&app, Method::GET, "/api/crypto/wallets/4040", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accepted_deposit_credits_once() {
    let (app, _) = app();
    let wallet_id = wallet(&app).await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/crypto/deposits",
        Some(json!({ "wallet_id": wallet_id, "amount": "100.50", "reference": "bank-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let tx = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/crypto/deposits/{tx}/status");
    let (status, body) = call(&app, Method::PATCH, &uri, Some(json!({ "status": "accepted" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transaction"]["status"], "accepted");
    assert_eq!(money(&body["data"]["wallet"]["balance"]), dec!(100.50));

    let (status, _) = call(&app, Method::PATCH, &uri, Some(json!({ "status": "accepted" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::GET, &format!("/api/crypto/wallets/{wallet_id}"), None).await;
    assert_eq!(money(&body["data"]["balance"]), dec!(100.50));
}

#[tokio::test]
async fn rejected_deposit_leaves_balance() {
    let (app, _) = app();
    let wallet_id = wallet(&app).await;
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/crypto/deposits",
        Some(json!({ "wallet_id": wallet_id, "amount": "20" })),
    )
    .await;
    let tx = body["data"]["id"].as_i64().unwrap();
    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/api/crypto/deposits/{tx}/status"),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["data"]["wallet"]["balance"]), Decimal::ZERO);
}

#[tokio::test]
async fn invalid_amount_and_status_are_bad_requests() {
    let (app, _) = app();
    let wallet_id = wallet(&app).await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/crypto/deposits",
        Some(json!({ "wallet_id": wallet_id, "amount": "0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for unstorable in ["0.000000001", "10.123456789", "1000000000000"] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/crypto/deposits",
            Some(json!({ "wallet_id": wallet_id, "amount": unstorable })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{unstorable}");
        assert_eq!(body["success"], false);
    }

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/crypto/deposits",
        Some(json!({ "wallet_id": wallet_id, "amount": "5" })),
    )
    .await;
    let tx = body["data"]["id"].as_i64().unwrap();
    let (status, _) = call(
        &app,
        Method::PATCH,
        &format!("/api/crypto/deposits/{tx}/status"),
        Some(json!({ "status": "maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdrawal_is_bounded_by_balance() {
    let (app, _) = app();
    let wallet_id = funded_wallet(&app, "100").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/crypto/withdrawals",
        Some(json!({ "wallet_id": wallet_id, "amount": "150" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/crypto/withdrawals",
        Some(json!({ "wallet_id": wallet_id, "amount": "40" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx = body["data"]["id"].as_i64().unwrap();
    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/api/crypto/withdrawals/{tx}/status"),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["data"]["wallet"]["balance"]), dec!(60));

    // a deposit id cannot be settled through the withdrawal route
    let (_, body) = call(&app, Method::GET, "/api/crypto/transactions?kind=deposit", None).await;
    let deposit = body["data"][0]["id"].as_i64().unwrap();
    let (status, _) = call(
        &app,
        Method::PATCH,
        &format!("/api/crypto/withdrawals/{deposit}/status"),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn payouts_follow_request_then_settle() {
    let (app, _) = app();
    let wallet_id = funded_wallet(&app, "50").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/crypto/payouts",
        Some(json!({ "wallet_id": wallet_id, "amount": "51" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/crypto/payouts",
        Some(json!({ "wallet_id": wallet_id, "amount": "30", "destination": "bc1qexample" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let payout = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/api/crypto/payouts/{payout}/status"),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payout"]["status"], "accepted");
    assert_eq!(money(&body["data"]["wallet"]["balance"]), dec!(20));

    let (status, body) = call(&app, Method::GET, &format!("/api/crypto/payouts?wallet_id={wallet_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn transaction_listing_filters_by_kind() {
    let (app, _) = app();
    let wallet_id = funded_wallet(&app, "80").await;
    call(
        &app,
        Method::POST,
        "/api/crypto/withdrawals",
        Some(json!({ "wallet_id": wallet_id, "amount": "10" })),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/crypto/transactions?wallet_id={wallet_id}&kind=withdrawal"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["kind"], "withdrawal");

    let (_, body) = call(&app, Method::GET, "/api/crypto/transactions?limit=1", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn subscription_lifecycle_pays_out_earnings() {
    let (app, repo) = app();
    let wallet_id = funded_wallet(&app, "500").await;
    let plan_id = repo.seed_plan(30, dec!(100), dec!(1000), true);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/subscription",
        Some(json!({ "wallet_id": wallet_id, "plan_id": plan_id, "amount": "50" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/subscription",
        Some(json!({ "wallet_id": wallet_id, "plan_id": plan_id, "amount": "600" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/subscription",
        Some(json!({ "wallet_id": wallet_id, "plan_id": plan_id, "amount": "200" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sub = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/crypto/earnings",
        Some(json!({ "subscription_id": sub, "amount": "12.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&body["data"]["subscription"]["earnings"]), dec!(12.5));

    let (status, _) = call(&app, Method::POST, &format!("/api/subscription/{sub}/expire"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    repo.set_end_date(sub, Utc::now() - Duration::minutes(1));
    let (status, body) = call(&app, Method::POST, &format!("/api/subscription/{sub}/expire"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expired"]["status"], "completed");
    assert!(body["data"]["renewed"].is_null());
    assert_eq!(money(&body["data"]["credited"]["amount"]), dec!(12.5));

    let (_, body) = call(&app, Method::GET, &format!("/api/crypto/wallets/{wallet_id}"), None).await;
    assert_eq!(money(&body["data"]["balance"]), dec!(512.5));

    let (status, _) = call(&app, Method::POST, &format!("/api/subscription/{sub}/expire"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reinvest_flag_renews_on_sweep() {
    let (app, repo) = app();
    let wallet_id = funded_wallet(&app, "300").await;
    let plan_id = repo.seed_plan(7, dec!(10), dec!(1000), true);
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/subscription",
        Some(json!({ "wallet_id": wallet_id, "plan_id": plan_id, "amount": "100" })),
    )
    .await;
    let sub = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("/api/subscription/{sub}/reinvest"),
        Some(json!({ "reinvest": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reinvest"], true);

    call(&app, Method::POST, "/api/crypto/earnings", Some(json!({ "subscription_id": sub, "amount": "5" }))).await;
    repo.set_end_date(sub, Utc::now() - Duration::seconds(1));

    let (status, body) = call(&app, Method::POST, "/api/subscription/expire-due", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reinvested"], 1);
    assert_eq!(body["data"]["failed"], 0);

    let (_, body) = call(&app, Method::GET, &format!("/api/subscription?wallet_id={wallet_id}"), None).await;
    let subs = body["data"].as_array().unwrap();
    assert_eq!(subs.len(), 2);
    let renewed = subs.iter().find(|s| s["renewed_from"].as_i64() == Some(sub)).unwrap();
    assert_eq!(money(&renewed["amount"]), dec!(105));
    assert_eq!(renewed["status"], "active");
}

#[tokio::test]
async fn metrics_endpoint_exposes_http_counters() {
    let (app, _) = app();
    call(&app, Method::GET, "/health", None).await;
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("crypto_invest_http_requests_total"));
}
