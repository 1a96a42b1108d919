//! Issue status model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::issue_statuses;

/// A workflow status issues can be in.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = issue_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IssueStatus {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    /// Hex color in `#rrggbb` form.
    pub color: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Data for creating a new issue status.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = issue_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewIssueStatus {
    pub project_id: Uuid,
    pub display_name: String,
    pub color: String,
    pub position: i32,
}

/// Data for updating an issue status.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = issue_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateIssueStatus {
    pub display_name: Option<String>,
    pub color: Option<String>,
    pub position: Option<i32>,
}

impl UpdateIssueStatus {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.color.is_none() && self.position.is_none()
    }
}
