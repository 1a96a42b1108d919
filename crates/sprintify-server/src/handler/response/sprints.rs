use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::Sprint as SprintModel;
use sprintify_postgres::types::SprintState;
use uuid::Uuid;

use super::envelope;

/// A time-boxed iteration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    pub goal: String,
    pub state: SprintState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Sprint {
    pub fn from_model(sprint: SprintModel) -> Self {
        Self {
            id: sprint.id,
            project_id: sprint.project_id,
            display_name: sprint.display_name,
            goal: sprint.goal,
            state: sprint.sprint_state,
            starts_at: sprint.starts_at.map(Into::into),
            ends_at: sprint.ends_at.map(Into::into),
            created_at: sprint.created_at.into(),
            updated_at: sprint.updated_at.into(),
        }
    }

    pub fn from_models(sprints: Vec<SprintModel>) -> Vec<Self> {
        sprints.into_iter().map(Self::from_model).collect()
    }
}

envelope!(SprintResponse { sprint: Sprint });
envelope!(SprintsResponse { sprints: Vec<Sprint> });
