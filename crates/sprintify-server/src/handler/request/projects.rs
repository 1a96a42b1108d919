//! Project request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::{NewProject, UpdateProject as UpdateProjectModel};
use uuid::Uuid;
use validator::Validate;

/// Request payload for creating a project.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    /// Display name of the project.
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
    /// Optional description.
    #[validate(length(max = 4096))]
    pub description: Option<String>,
}

impl CreateProject {
    /// Converts into the insertable model owned by `created_by`.
    pub fn into_model(self, created_by: Uuid) -> NewProject {
        NewProject {
            display_name: self.display_name.trim().to_owned(),
            description: self.description.unwrap_or_default(),
            created_by,
        }
    }
}

/// Request payload for updating a project.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    /// New display name.
    #[validate(length(min = 1, max = 128))]
    pub display_name: Option<String>,
    /// New description.
    #[validate(length(max = 4096))]
    pub description: Option<String>,
}

impl UpdateProject {
    /// Converts into the changeset model.
    pub fn into_model(self) -> UpdateProjectModel {
        UpdateProjectModel {
            display_name: self.display_name.map(|name| name.trim().to_owned()),
            description: self.description,
        }
    }
}
