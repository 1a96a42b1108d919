use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::IssueStatus as IssueStatusModel;
use uuid::Uuid;

use super::envelope;

/// A workflow status an issue can be in.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueStatus {
    pub id: Uuid,
    pub project_id: Uuid,
    pub display_name: String,
    pub color: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl IssueStatus {
    pub fn from_model(status: IssueStatusModel) -> Self {
        Self {
            id: status.id,
            project_id: status.project_id,
            display_name: status.display_name,
            color: status.color,
            position: status.position,
            created_at: status.created_at.into(),
            updated_at: status.updated_at.into(),
        }
    }

    pub fn from_models(statuses: Vec<IssueStatusModel>) -> Vec<Self> {
        statuses.into_iter().map(Self::from_model).collect()
    }
}

envelope!(IssueStatusResponse { status: IssueStatus });
envelope!(IssueStatusesResponse { statuses: Vec<IssueStatus> });
