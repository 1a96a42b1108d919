//! Board column model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::board_columns;

/// A column of a project's board.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardColumn {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    /// Ordering key, ascending from left to right.
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Data for creating a new board column.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBoardColumn {
    pub project_id: Uuid,
    pub display_name: String,
    pub position: i32,
}

/// Data for updating a board column.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateBoardColumn {
    pub display_name: Option<String>,
    pub position: Option<i32>,
}

impl UpdateBoardColumn {
    /// Returns whether no column would change.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.position.is_none()
    }
}
