use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::Epic as EpicModel;
use uuid::Uuid;

use super::envelope;

/// A group of related issues.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Epic {
    pub fn from_model(epic: EpicModel) -> Self {
        Self {
            id: epic.id,
            project_id: epic.project_id,
            display_name: epic.display_name,
            description: epic.description,
            created_by: epic.created_by,
            created_at: epic.created_at.into(),
            updated_at: epic.updated_at.into(),
        }
    }

    pub fn from_models(epics: Vec<EpicModel>) -> Vec<Self> {
        epics.into_iter().map(Self::from_model).collect()
    }
}

envelope!(EpicResponse { epic: Epic });
envelope!(EpicsResponse { epics: Vec<Epic> });
