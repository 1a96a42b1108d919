use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::types::Pagination;

/// Query parameters for listing notifications.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NotificationQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_optional(self.limit, self.offset)
    }
}
