//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path parameters for project-level operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
}

/// Path parameters for project member operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
    /// Unique identifier of the member account.
    pub account_id: Uuid,
}

/// Path parameters for epic operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpicPathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
    /// Unique identifier of the epic.
    pub epic_id: Uuid,
}

/// Path parameters for sprint operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintPathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
    /// Unique identifier of the sprint.
    pub sprint_id: Uuid,
}

/// Path parameters for board column operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
    /// Unique identifier of the board column.
    pub column_id: Uuid,
}

/// Path parameters for issue status operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusPathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
    /// Unique identifier of the status.
    pub status_id: Uuid,
}

/// Path parameters for issue operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuePathParams {
    /// Unique identifier of the project.
    pub project_id: Uuid,
    /// Unique identifier of the issue.
    pub issue_id: Uuid,
}

/// Path parameters for notification operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPathParams {
    /// Unique identifier of the notification.
    pub notification_id: Uuid,
}
