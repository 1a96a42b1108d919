//! Sprint model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::sprints;
use crate::types::SprintState;

/// A time-boxed iteration of a project.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = sprints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Sprint {
    /// Unique sprint identifier.
    pub id: Uuid,
    /// Reference to the project.
    pub project_id: Uuid,
    /// Sprint name.
    pub display_name: String,
    /// What the sprint intends to deliver.
    pub goal: String,
    /// Lifecycle state.
    pub sprint_state: SprintState,
    /// Planned or actual start.
    pub starts_at: Option<Timestamp>,
    /// Planned or actual end.
    pub ends_at: Option<Timestamp>,
    /// Timestamp when the sprint was created.
    pub created_at: Timestamp,
    /// Timestamp of the last update.
    pub updated_at: Timestamp,
}

/// Data for creating a new sprint.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sprints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSprint {
    pub project_id: Uuid,
    pub display_name: String,
    pub goal: String,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}

/// Data for updating a sprint.
///
/// Nullable columns use `Option<Option<_>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = sprints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateSprint {
    pub display_name: Option<String>,
    pub goal: Option<String>,
    pub sprint_state: Option<SprintState>,
    pub starts_at: Option<Option<Timestamp>>,
    pub ends_at: Option<Option<Timestamp>>,
}

impl UpdateSprint {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.goal.is_none()
            && self.sprint_state.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
    }
}
