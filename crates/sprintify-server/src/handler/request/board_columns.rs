//! Board column request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::{NewBoardColumn, UpdateBoardColumn as UpdateBoardColumnModel};
use uuid::Uuid;
use validator::Validate;

/// Request payload for adding a board column.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardColumn {
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
    /// Zero-based position from the left; appended when absent.
    #[validate(range(min = 0, max = 1000))]
    pub position: Option<i32>,
}

impl CreateBoardColumn {
    pub fn into_model(self, project_id: Uuid, next_position: i32) -> NewBoardColumn {
        NewBoardColumn {
            project_id,
            display_name: self.display_name.trim().to_owned(),
            position: self.position.unwrap_or(next_position),
        }
    }
}

/// Request payload for renaming or moving a board column.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardColumn {
    #[validate(length(min = 1, max = 50))]
    pub display_name: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub position: Option<i32>,
}

impl UpdateBoardColumn {
    pub fn into_model(self) -> UpdateBoardColumnModel {
        UpdateBoardColumnModel {
            display_name: self.display_name.map(|name| name.trim().to_owned()),
            position: self.position,
        }
    }
}
