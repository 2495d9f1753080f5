//! HTTP surface of the platform: axum routes, response envelopes and startup.

pub mod errors;
pub mod extract;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::{run, run_with_config};
