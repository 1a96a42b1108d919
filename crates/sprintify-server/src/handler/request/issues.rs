//! Issue request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_postgres::model::{NewIssue, UpdateIssue as UpdateIssueModel};
use sprintify_postgres::query::IssueFilter;
use sprintify_postgres::types::Pagination;
use uuid::Uuid;
use validator::Validate;

use super::deserialize_nullable;

/// Query parameters for listing issues.
#[must_use]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueQuery {
    /// Only issues in this sprint.
    pub sprint_id: Option<Uuid>,
    /// Only issues in this board column.
    pub column_id: Option<Uuid>,
    /// Only issues in this epic.
    pub epic_id: Option<Uuid>,
    /// Only issues assigned to this account.
    pub assignee_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl IssueQuery {
    /// Splits the query into a filter and pagination.
    pub fn into_parts(self) -> (IssueFilter, Pagination) {
        let filter = IssueFilter {
            sprint_id: self.sprint_id,
            column_id: self.column_id,
            epic_id: self.epic_id,
            assignee_id: self.assignee_id,
        };
        (filter, Pagination::from_optional(self.limit, self.offset))
    }
}

/// Request payload for creating an issue.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssue {
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub epic_id: Option<Uuid>,
    pub sprint_id: Option<Uuid>,
    pub column_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    #[validate(range(min = 0, max = 100))]
    pub story_points: Option<i32>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    /// Must be a member of the project.
    pub assignee_id: Option<Uuid>,
}

impl CreateIssue {
    pub fn into_model(self, project_id: Uuid, reporter_id: Uuid) -> NewIssue {
        NewIssue {
            project_id,
            epic_id: self.epic_id,
            sprint_id: self.sprint_id,
            column_id: self.column_id,
            status_id: self.status_id,
            title: self.title.trim().to_owned(),
            description: self.description.unwrap_or_default(),
            story_points: self.story_points,
            position: self.position.unwrap_or_default(),
            assignee_id: self.assignee_id,
            reporter_id,
        }
    }
}

/// Request payload for updating or moving an issue.
///
/// Nullable references accept `null` to clear them; omitted fields are
/// left unchanged.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssue {
    #[validate(length(min = 1, max = 512))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub epic_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub sprint_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub column_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub status_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub story_points: Option<Option<i32>>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub assignee_id: Option<Option<Uuid>>,
}

impl UpdateIssue {
    /// Returns the newly requested assignee, if the update sets one.
    pub fn new_assignee(&self) -> Option<Uuid> {
        self.assignee_id.flatten()
    }

    pub fn into_model(self) -> UpdateIssueModel {
        UpdateIssueModel {
            epic_id: self.epic_id,
            sprint_id: self.sprint_id,
            column_id: self.column_id,
            status_id: self.status_id,
            title: self.title.map(|title| title.trim().to_owned()),
            description: self.description,
            story_points: self.story_points,
            position: self.position,
            assignee_id: self.assignee_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_assignee_unassigns() {
        let update: UpdateIssue = serde_json::from_str(r#"{"assigneeId":null}"#).unwrap();
        assert_eq!(update.assignee_id, Some(None));
        assert_eq!(update.new_assignee(), None);
        assert_eq!(update.into_model().assignee_id, Some(None));
    }

    #[test]
    fn omitted_fields_are_unchanged() {
        let update: UpdateIssue = serde_json::from_str(r#"{"title":"Fix login"}"#).unwrap();
        let model = update.into_model();
        assert_eq!(model.title.as_deref(), Some("Fix login"));
        assert_eq!(model.column_id, None);
        assert_eq!(model.assignee_id, None);
    }

    #[test]
    fn story_points_over_range_fail() {
        let issue = CreateIssue {
            title: "Too big".into(),
            description: None,
            epic_id: None,
            sprint_id: None,
            column_id: None,
            status_id: None,
            story_points: Some(500),
            position: None,
            assignee_id: None,
        };
        assert!(issue.validate().is_err());
    }
}
