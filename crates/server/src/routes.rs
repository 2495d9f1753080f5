use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::{metrics, types::Health};

use crate::state::ServerState;

pub mod blogs;
pub mod crypto;
pub mod news;
pub mod payment_gateways;
pub mod post_deposits;
pub mod subscriptions;
pub mod testimonials;
pub mod users;

/// `?published=true|false` filter shared by content listings.
#[derive(Debug, Default, Deserialize)]
pub struct PublishedFilter {
    pub published: Option<bool>,
}

/// `?status=...` filter shared by listings with a status column.
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

pub async fn health(State(state): State<ServerState>) -> Json<Health> {
    let database = if state.db.ping().await.is_ok() { "up" } else { "down" };
    Json(Health { status: "ok", database })
}

async fn metrics_handler() -> impl IntoResponse {
    metrics::encode_metrics()
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let start = Instant::now();
    let res = next.run(req).await;
    metrics::HTTP_REQUEST_DURATION.observe(start.elapsed().as_secs_f64());
    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), res.status().as_str()])
        .inc();
    res
}

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "success": false, "message": "Not Found", "error": "no such route" })),
    )
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .nest("/api/auth", users::router())
        .nest("/api/crypto", crypto::router().merge(payment_gateways::router()).merge(news::router()))
        .nest("/api/subscription", subscriptions::router())
        .nest("/api/testimonial", testimonials::router())
        .nest("/api/postDeposits", post_deposits::router())
        .nest("/api/blogs", blogs::router());

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency on response
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
