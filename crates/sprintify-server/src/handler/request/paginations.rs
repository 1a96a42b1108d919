use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::types::Pagination;

/// Offset pagination query parameters.
///
/// `limit` defaults to 20 and is clamped to `1..=100`; a negative `offset`
/// is treated as zero.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    /// Maximum number of records to return.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        Pagination::from_optional(query.limit, query.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let pagination: Pagination = PaginationQuery {
            limit: Some(500),
            offset: Some(-3),
        }
        .into();

        assert_eq!(pagination.limit, 100);
        assert_eq!(pagination.offset, 0);
    }

    #[test]
    fn defaults_when_absent() {
        let pagination: Pagination = PaginationQuery::default().into();
        assert_eq!(pagination.limit, 20);
        assert_eq!(pagination.offset, 0);
    }
}
