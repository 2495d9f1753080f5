//! Shared plumbing for the workspace: logging setup, Prometheus metrics,
//! the admin side server and small wire types.

pub mod types;
pub mod utils;
pub mod metrics;
pub mod admin_http;
