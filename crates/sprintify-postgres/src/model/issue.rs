//! Issue model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::issues;

/// A unit of work tracked on the board.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Issue {
    /// Unique issue identifier.
    pub id: Uuid,
    /// Reference to the project.
    pub project_id: Uuid,
    /// Epic the issue belongs to.
    pub epic_id: Option<Uuid>,
    /// Sprint the issue is planned in.
    pub sprint_id: Option<Uuid>,
    /// Board column the issue sits in.
    pub column_id: Option<Uuid>,
    /// Workflow status.
    pub status_id: Option<Uuid>,
    /// Short summary.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Estimate, 0 to 100.
    pub story_points: Option<i32>,
    /// Ordering key within the column.
    pub position: i32,
    /// Account responsible for the issue.
    pub assignee_id: Option<Uuid>,
    /// Account that created the issue.
    pub reporter_id: Uuid,
    /// Timestamp when the issue was created.
    pub created_at: Timestamp,
    /// Timestamp of the last update.
    pub updated_at: Timestamp,
}

/// Data for creating a new issue.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewIssue {
    pub project_id: Uuid,
    pub epic_id: Option<Uuid>,
    pub sprint_id: Option<Uuid>,
    pub column_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub story_points: Option<i32>,
    pub position: i32,
    pub assignee_id: Option<Uuid>,
    pub reporter_id: Uuid,
}

/// Data for updating or moving an issue.
///
/// Nullable columns use `Option<Option<_>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateIssue {
    pub epic_id: Option<Option<Uuid>>,
    pub sprint_id: Option<Option<Uuid>>,
    pub column_id: Option<Option<Uuid>>,
    pub status_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub story_points: Option<Option<i32>>,
    pub position: Option<i32>,
    pub assignee_id: Option<Option<Uuid>>,
}

impl UpdateIssue {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.epic_id.is_none()
            && self.sprint_id.is_none()
            && self.column_id.is_none()
            && self.status_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.story_points.is_none()
            && self.position.is_none()
            && self.assignee_id.is_none()
    }
}
