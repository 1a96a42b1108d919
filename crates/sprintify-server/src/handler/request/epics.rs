//! Epic request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::{NewEpic, UpdateEpic as UpdateEpicModel};
use uuid::Uuid;
use validator::Validate;

/// Request payload for creating an epic.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpic {
    /// Display name of the epic.
    #[validate(length(min = 1, max = 256))]
    pub display_name: String,
    /// Optional description.
    #[validate(length(max = 4096))]
    pub description: Option<String>,
}

impl CreateEpic {
    pub fn into_model(self, project_id: Uuid, created_by: Uuid) -> NewEpic {
        NewEpic {
            project_id,
            display_name: self.display_name.trim().to_owned(),
            description: self.description.unwrap_or_default(),
            created_by,
        }
    }
}

/// Request payload for updating an epic.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEpic {
    #[validate(length(min = 1, max = 256))]
    pub display_name: Option<String>,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
}

impl UpdateEpic {
    pub fn into_model(self) -> UpdateEpicModel {
        UpdateEpicModel {
            display_name: self.display_name.map(|name| name.trim().to_owned()),
            description: self.description,
        }
    }
}
