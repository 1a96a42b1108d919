//! Epic model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::epics;

/// A group of related issues.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = epics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Epic {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Data for creating a new epic.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = epics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewEpic {
    pub project_id: Uuid,
    pub display_name: String,
    pub description: String,
    pub created_by: Uuid,
}

/// Data for updating an epic.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = epics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateEpic {
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl UpdateEpic {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.description.is_none()
    }
}
