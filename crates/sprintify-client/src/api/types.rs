//! Request and response bodies of the REST API.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sprintify_core::NotificationPayload;
use uuid::Uuid;

/// Issue as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Partial issue update.
///
/// `None` leaves a field unchanged. For nullable references `Some(None)`
/// clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_points: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<Uuid>>,
}

impl IssuePatch {
    /// Moves the issue to a board column at the given position.
    pub fn move_to(column_id: Option<Uuid>, position: i32) -> Self {
        Self {
            column_id: Some(column_id),
            position: Some(position),
            ..Self::default()
        }
    }

    /// Assigns the issue, or unassigns it with `None`.
    pub fn assign(assignee_id: Option<Uuid>) -> Self {
        Self {
            assignee_id: Some(assignee_id),
            ..Self::default()
        }
    }

    /// Applies the patch to a local copy of the issue.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(title) = &self.title {
            issue.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            issue.description.clone_from(description);
        }
        if let Some(epic_id) = self.epic_id {
            issue.epic_id = epic_id;
        }
        if let Some(sprint_id) = self.sprint_id {
            issue.sprint_id = sprint_id;
        }
        if let Some(column_id) = self.column_id {
            issue.column_id = column_id;
        }
        if let Some(status_id) = self.status_id {
            issue.status_id = status_id;
        }
        if let Some(story_points) = self.story_points {
            issue.story_points = story_points;
        }
        if let Some(position) = self.position {
            issue.position = position;
        }
        if let Some(assignee_id) = self.assignee_id {
            issue.assignee_id = assignee_id;
        }
    }
}

/// Filters for listing a project's issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Filters for listing notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unread_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Page metadata of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub has_more: bool,
}

/// `GET /api/v1/notifications`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsPage {
    pub notifications: Vec<NotificationPayload>,
    pub unread_count: i64,
    pub pagination: Option<PageInfo>,
}

/// `GET /api/v1/notifications/unread-count`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnreadCount {
    pub unread_count: i64,
}

/// `PATCH /api/v1/notifications/{id}/read`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRead {
    pub notification: NotificationPayload,
    pub unread_count: i64,
}

/// `PATCH /api/v1/notifications/mark-all-read`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRead {
    pub updated: usize,
    pub unread_count: i64,
}

/// `DELETE /api/v1/notifications/{id}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDeleted {
    pub notification_id: Uuid,
    pub unread_count: i64,
}

/// `{ "issue": ... }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueEnvelope {
    pub issue: Issue,
}

/// `{ "issues": [...], "pagination": ... }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuesPage {
    pub issues: Vec<Issue>,
    pub pagination: PageInfo,
}

/// Error envelope `{ success: false, name, message, errors? }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorBody {
    pub name: String,
    pub message: String,
    pub errors: Vec<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    pub(crate) fn issue(id: u128) -> Issue {
        Issue {
            id: Uuid::from_u128(id),
            project_id: Uuid::from_u128(1000),
            epic_id: None,
            sprint_id: None,
            column_id: Some(Uuid::from_u128(1)),
            status_id: None,
            title: format!("Issue {id}"),
            description: String::new(),
            story_points: Some(3),
            position: 0,
            assignee_id: None,
            reporter_id: Uuid::from_u128(2000),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn patch_distinguishes_clear_from_unchanged() {
        let patch = IssuePatch {
            sprint_id: Some(None),
            position: Some(4),
            ..IssuePatch::default()
        };

        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "sprintId": null, "position": 4 }));
    }

    #[test]
    fn patch_applies_locally() {
        let column = Uuid::from_u128(9);
        let mut local = issue(1);
        IssuePatch::move_to(Some(column), 2).apply_to(&mut local);

        assert_eq!(local.column_id, Some(column));
        assert_eq!(local.position, 2);
        assert_eq!(local.story_points, Some(3));
    }

    #[test]
    fn notification_filter_omits_defaults() {
        let value = serde_json::to_value(NotificationFilter::default()).unwrap();
        assert_eq!(value, json!({}));

        let filter = NotificationFilter {
            unread_only: true,
            limit: Some(10),
            offset: None,
        };
        let value = serde_json::to_value(filter).unwrap();
        assert_eq!(value, json!({ "unreadOnly": true, "limit": 10 }));
    }
}
