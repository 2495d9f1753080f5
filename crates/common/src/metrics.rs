use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crypto_invest_http_requests_total",
        "Total HTTP requests by method and status class",
        &["method", "status"]
    )
    .expect("register http_requests_total")
});

pub static HTTP_REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "crypto_invest_http_request_duration_seconds",
        "Request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("register http_request_duration")
});

/// Pending ledger requests created, by kind (deposit, withdrawal, payout, earning).
pub static LEDGER_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crypto_invest_ledger_requests_total",
        "Ledger requests recorded",
        &["kind"]
    )
    .expect("register ledger_requests_total")
});

/// Status transitions, by kind and outcome (accepted, rejected, failed).
pub static LEDGER_SETTLEMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crypto_invest_ledger_settlements_total",
        "Ledger status transitions",
        &["kind", "outcome"]
    )
    .expect("register ledger_settlements_total")
});

pub static SUBSCRIPTION_EXPIRIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crypto_invest_subscription_expiries_total",
        "Subscription expirations by outcome",
        &["outcome"]
    )
    .expect("register subscription_expiries_total")
});

pub fn record_ledger_request(kind: &str) {
    LEDGER_REQUESTS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_settlement(kind: &str, outcome: &str) {
    LEDGER_SETTLEMENTS_TOTAL.with_label_values(&[kind, outcome]).inc();
}

pub fn record_expiry(outcome: &str) {
    SUBSCRIPTION_EXPIRIES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
