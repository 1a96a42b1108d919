use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::Issue as IssueModel;
use uuid::Uuid;

use super::{envelope, page_envelope};

/// A unit of work on the board.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub project_id: Uuid,
    pub epic_id: Option<Uuid>,
    pub sprint_id: Option<Uuid>,
    pub column_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub story_points: Option<i32>,
    pub position: i32,
    pub assignee_id: Option<Uuid>,
    pub reporter_id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Issue {
    pub fn from_model(issue: IssueModel) -> Self {
        Self {
            id: issue.id,
            project_id: issue.project_id,
            epic_id: issue.epic_id,
            sprint_id: issue.sprint_id,
            column_id: issue.column_id,
            status_id: issue.status_id,
            title: issue.title,
            description: issue.description,
            story_points: issue.story_points,
            position: issue.position,
            assignee_id: issue.assignee_id,
            reporter_id: issue.reporter_id,
            created_at: issue.created_at.into(),
            updated_at: issue.updated_at.into(),
        }
    }

    pub fn from_models(issues: Vec<IssueModel>) -> Vec<Self> {
        issues.into_iter().map(Self::from_model).collect()
    }
}

envelope!(IssueResponse { issue: Issue });

page_envelope!(
    /// Paginated, filtered list of issues.
    IssuesResponse { issues: Issue }
);
