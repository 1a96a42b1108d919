//! Project model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::projects;

/// A project: the unit of membership and authorization.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    /// Unique project identifier.
    pub id: Uuid,
    /// Project name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
    /// Account that created the project.
    pub created_by: Uuid,
    /// Timestamp when the project was created.
    pub created_at: Timestamp,
    /// Timestamp of the last update.
    pub updated_at: Timestamp,
}

/// Data for creating a new project.
#[derive(Debug, Clone, Default, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewProject {
    pub display_name: String,
    pub description: String,
    pub created_by: Uuid,
}

/// Data for updating a project.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateProject {
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl UpdateProject {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.description.is_none()
    }
}
