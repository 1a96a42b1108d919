//! Offset-based pagination for list queries.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Smallest accepted page size.
pub const MIN_LIMIT: i64 = 1;

/// Largest accepted page size.
pub const MAX_LIMIT: i64 = 100;

/// Page size used when none is requested.
pub const DEFAULT_LIMIT: i64 = 20;

/// Offset pagination parameters.
///
/// Values outside the accepted range are clamped: the limit to
/// `MIN_LIMIT..=MAX_LIMIT` and the offset to zero or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
}

impl Pagination {
    /// Creates a new pagination instance.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(MIN_LIMIT, MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Creates pagination from optional request values.
    pub fn from_optional(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::new(limit.unwrap_or(DEFAULT_LIMIT), offset.unwrap_or(0))
    }

    /// Describes the page returned for a query matching `total` rows.
    pub fn page_info(&self, returned: usize, total: i64) -> PageInfo {
        PageInfo {
            limit: self.limit,
            offset: self.offset,
            total,
            has_more: self.offset + (returned as i64) < total,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Page size that was applied.
    pub limit: i64,
    /// Offset that was applied.
    pub offset: i64,
    /// Number of rows matching the query across all pages.
    pub total: i64,
    /// Whether rows exist after this page.
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.limit, DEFAULT_LIMIT);
        assert_eq!(pagination.offset, 0);
        assert_eq!(Pagination::from_optional(None, None), pagination);
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Pagination::new(0, -4), Pagination::new(MIN_LIMIT, 0));
        assert_eq!(Pagination::new(500, 10).limit, MAX_LIMIT);
    }

    #[test]
    fn page_info_has_more() {
        let pagination = Pagination::new(20, 20);
        assert!(pagination.page_info(20, 41).has_more);
        assert!(!pagination.page_info(20, 40).has_more);
        assert!(!pagination.page_info(0, 0).has_more);
    }
}
