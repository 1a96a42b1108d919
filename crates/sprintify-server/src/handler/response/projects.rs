//! Project response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_core::ProjectRole;
use sprintify_postgres::model::{Project as ProjectModel, ProjectMember};
use uuid::Uuid;

use super::{envelope, page_envelope};

/// A project, optionally annotated with the caller's role in it.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub display_name: String,
    pub description: String,
    pub created_by: Uuid,
    /// Role of the requesting account, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ProjectRole>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn from_model(project: ProjectModel) -> Self {
        Self {
            id: project.id,
            display_name: project.display_name,
            description: project.description,
            created_by: project.created_by,
            role: None,
            created_at: project.created_at.into(),
            updated_at: project.updated_at.into(),
        }
    }

    pub fn with_role(mut self, role: ProjectRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn from_memberships(rows: Vec<(ProjectModel, ProjectMember)>) -> Vec<Self> {
        rows.into_iter()
            .map(|(project, member)| Self::from_model(project).with_role(member.member_role))
            .collect()
    }
}

envelope!(
    /// Single project response.
    ProjectResponse { project: Project }
);

page_envelope!(
    /// Paginated list of the caller's projects.
    ProjectsResponse { projects: Project }
);
