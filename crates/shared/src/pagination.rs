//! Offset pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on a single page.
pub const MAX_LIMIT: i64 = 500;

/// Pagination parameters accepted by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    /// Limit clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Offset, never negative.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// A page of results with the total count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page, deriving `has_more` from the request window.
    pub fn new(items: Vec<T>, total_count: i64, request: &PageRequest) -> Self {
        let has_more = request.offset() + (items.len() as i64) < total_count;
        Self {
            items,
            total_count,
            has_more,
        }
    }
}
