//! Pagination utilities for service layer
//!
//! Accepts either `page`/`limit` or `limit`/`offset`; an explicit offset wins.

use serde::Deserialize;

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Pagination parameters, usually taken straight from the query string
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: Option<u64>,
    /// items per page
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Clamp to sane defaults and resolve to `(offset, limit)`
    pub fn window(self) -> (u64, u64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = match self.offset {
            Some(o) => o,
            None => (self.page.unwrap_or(1).max(1) - 1).saturating_mul(limit),
        };
        (offset, limit)
    }
}
