//! Offset/limit pagination types.
//!
//! Discovery and list endpoints page with limit/offset and report the total
//! matching count plus a has-more flag, computed from the same predicate
//! evaluation as the page itself so the two can never drift.

use serde::Serialize;

use crate::common::errors::{DirectoryError, DirectoryResult};

/// Default page size when the caller does not specify one.
pub const DEFAULT_LIMIT: i64 = 20;

/// Upper bound on page size.
pub const MAX_LIMIT: i64 = 100;

/// Validated limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    /// Applies defaults and bounds: limit clamped to 1..=100 (default 20),
    /// offset must be non-negative.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> DirectoryResult<Self> {
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(DirectoryError::validation("offset must be non-negative"));
        }

        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok(PageRequest { limit, offset })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results plus the totals the caller needs to keep paging.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub has_more: bool,
}

/// Slice a fully-materialized, ordered result set into one page.
pub fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items: Vec<T> = items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect();
    let has_more = page.offset + (items.len() as i64) < total;

    Page {
        items,
        total,
        has_more,
    }
}
