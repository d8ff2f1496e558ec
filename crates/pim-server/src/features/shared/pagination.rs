//! Shared pagination utilities
//!
//! Common pagination request parameters used across list queries.

use serde::{Deserialize, Serialize};

/// Common pagination request parameters
///
/// Used in list queries to specify page and items per page.
/// Provides sensible defaults (page 1, 20 items per page).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 20, clamped to 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    /// Get the page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page, defaulting to 20 and clamped to 1-100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    /// Calculate the offset for SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let params = PaginationParams {
            page: Some(-3),
            per_page: Some(1000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 100);
    }

    #[test]
    fn test_offset() {
        let params = PaginationParams {
            page: Some(3),
            per_page: Some(25),
        };
        assert_eq!(params.offset(), 50);
    }
}
