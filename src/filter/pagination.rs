use std::collections::HashMap;

use crate::config;

/// Normalized pagination derived from raw `page` / `limit` query values.
///
/// `page` falls back to 1 when missing, non-numeric or below 1. `limit`
/// falls back to the configured default when missing, non-numeric or below
/// 1, and is capped at the configured maximum. `skip` is always
/// `(page - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
}

impl Pagination {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let api = &config::config().api;
        Self::normalize(
            params.get("page").map(String::as_str),
            params.get("limit").map(String::as_str),
            api.default_page_size,
            api.max_page_size,
        )
    }

    fn normalize(
        raw_page: Option<&str>,
        raw_limit: Option<&str>,
        default_limit: i64,
        max_limit: i64,
    ) -> Self {
        let page = raw_page
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = raw_limit
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .map(|l| l.min(max_limit))
            .unwrap_or(default_limit);

        Self {
            page,
            limit,
            skip: (page - 1) * limit,
        }
    }

    pub fn total_pages(&self, total_count: i64) -> i64 {
        if total_count <= 0 {
            0
        } else {
            (total_count + self.limit - 1) / self.limit
        }
    }
}
