use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::BoardColumn as BoardColumnModel;
use uuid::Uuid;

use super::envelope;

/// A column of the project board.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BoardColumn {
    pub fn from_model(column: BoardColumnModel) -> Self {
        Self {
            id: column.id,
            project_id: column.project_id,
            display_name: column.display_name,
            position: column.position,
            created_at: column.created_at.into(),
            updated_at: column.updated_at.into(),
        }
    }

    pub fn from_models(columns: Vec<BoardColumnModel>) -> Vec<Self> {
        columns.into_iter().map(Self::from_model).collect()
    }
}

envelope!(BoardColumnResponse { column: BoardColumn });
envelope!(BoardColumnsResponse { columns: Vec<BoardColumn> });
