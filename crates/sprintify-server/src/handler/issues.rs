//! Issue handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use serde_json::json;
use sprintify_core::{NotificationPriority, NotificationType, Permission};
use sprintify_postgres::PgConn;
use sprintify_postgres::model::{Issue as IssueModel, NewNotification};
use sprintify_postgres::query::{
    EpicRepository, IssueRepository, ProjectMemberRepository, SprintRepository,
};
use uuid::Uuid;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{
    CreateIssue, IssuePathParams, IssueQuery, ProjectPathParams, UpdateIssue,
};
use crate::handler::response::{ErrorResponse, Issue, IssueResponse, IssuesResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{NotificationDispatcher, ServiceState};

/// Tracing target for issue operations.
const TRACING_TARGET: &str = "sprintify_server::handler::issues";

fn issue_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Issue not found")
        .with_resource("issue")
}

/// Rejects references to epics, sprints or assignees outside the project.
async fn check_references(
    conn: &mut PgConn,
    project_id: Uuid,
    epic_id: Option<Uuid>,
    sprint_id: Option<Uuid>,
    assignee_id: Option<Uuid>,
) -> Result<()> {
    if let Some(epic_id) = epic_id
        && conn.find_project_epic(project_id, epic_id).await?.is_none()
    {
        return Err(ErrorKind::BadRequest
            .with_message("Epic does not belong to this project")
            .with_resource("epic"));
    }

    if let Some(sprint_id) = sprint_id
        && conn.find_project_sprint(project_id, sprint_id).await?.is_none()
    {
        return Err(ErrorKind::BadRequest
            .with_message("Sprint does not belong to this project")
            .with_resource("sprint"));
    }

    if let Some(assignee_id) = assignee_id
        && conn
            .find_project_member(project_id, assignee_id)
            .await?
            .is_none()
    {
        return Err(ErrorKind::BadRequest
            .with_message("Assignee is not a member of this project")
            .with_resource("member"));
    }

    Ok(())
}

/// Returns the account to notify about an assignment, if any.
///
/// Nobody is notified when they assign themselves or when the assignee is unchanged.
fn assignment_recipient(
    previous: Option<Uuid>,
    current: Option<Uuid>,
    actor_id: Uuid,
) -> Option<Uuid> {
    current.filter(|assignee| Some(*assignee) != previous && *assignee != actor_id)
}

async fn notify_assignee(
    conn: &mut PgConn,
    dispatcher: &NotificationDispatcher,
    issue: &IssueModel,
    recipient_id: Uuid,
    actor_id: Uuid,
) {
    let notification = NewNotification {
        recipient_id,
        sender_id: Some(actor_id),
        project_id: Some(issue.project_id),
        notify_type: NotificationType::TaskAssigned,
        priority: NotificationPriority::Medium,
        title: "New task assigned".to_owned(),
        message: format!("You were assigned \"{}\".", issue.title),
        metadata: json!({ "issueId": issue.id, "projectId": issue.project_id }),
        action_url: Some(format!("/projects/{}/issues/{}", issue.project_id, issue.id)),
    };

    if let Err(error) = dispatcher.notify(conn, notification).await {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %error,
            issue_id = %issue.id,
            assignee_id = %recipient_id,
            "Assignment notification not created",
        );
    }
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn list_issues(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    Query(query): Query<IssueQuery>,
) -> Result<(StatusCode, Json<IssuesResponse>)> {
    let project_id = path_params.project_id;
    auth_state.authorize_member(&mut conn, project_id).await?;

    let (filter, pagination) = query.into_parts();
    let issues = conn
        .list_project_issues(project_id, filter, pagination)
        .await?;
    let total = conn.count_project_issues(project_id, filter).await?;

    let page_info = pagination.page_info(issues.len(), total);
    tracing::debug!(
        target: TRACING_TARGET,
        returned = issues.len(),
        total,
        "Issues listed",
    );

    Ok((
        StatusCode::OK,
        Json(IssuesResponse::new(Issue::from_models(issues), page_info)),
    ))
}

fn list_issues_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List issues")
        .description("Lists issues of a project, optionally filtered by sprint, column, epic or assignee.")
        .response::<200, Json<IssuesResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn create_issue(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<CreateIssue>,
) -> Result<(StatusCode, Json<IssueResponse>)> {
    let project_id = path_params.project_id;
    auth_state
        .authorize_project(&mut conn, project_id, &Method::POST, Permission::CreateTask)
        .await?;

    check_references(
        &mut conn,
        project_id,
        request.epic_id,
        request.sprint_id,
        request.assignee_id,
    )
    .await?;

    let issue = conn
        .create_issue(request.into_model(project_id, auth_state.account_id))
        .await?;

    tracing::info!(target: TRACING_TARGET, issue_id = %issue.id, "Issue created");

    if let Some(recipient_id) = assignment_recipient(None, issue.assignee_id, auth_state.account_id)
    {
        notify_assignee(&mut conn, &dispatcher, &issue, recipient_id, auth_state.account_id).await;
    }

    Ok((StatusCode::CREATED, Json(IssueResponse::new(Issue::from_model(issue)))))
}

fn create_issue_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create issue")
        .description("Creates an issue. An assignee other than the reporter is notified.")
        .response::<201, Json<IssueResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        issue_id = %path_params.issue_id,
    )
)]
async fn update_issue(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<IssuePathParams>,
    ValidateJson(request): ValidateJson<UpdateIssue>,
) -> Result<(StatusCode, Json<IssueResponse>)> {
    let IssuePathParams {
        project_id,
        issue_id,
    } = path_params;

    auth_state
        .authorize_project(&mut conn, project_id, &Method::PATCH, Permission::UpdateTask)
        .await?;

    let Some(current) = conn.find_project_issue(project_id, issue_id).await? else {
        return Err(issue_not_found());
    };

    check_references(
        &mut conn,
        project_id,
        request.epic_id.flatten(),
        request.sprint_id.flatten(),
        request.new_assignee(),
    )
    .await?;

    let Some(issue) = conn
        .update_issue(project_id, issue_id, request.into_model())
        .await?
    else {
        return Err(issue_not_found());
    };

    tracing::info!(target: TRACING_TARGET, "Issue updated");

    if let Some(recipient_id) =
        assignment_recipient(current.assignee_id, issue.assignee_id, auth_state.account_id)
    {
        notify_assignee(&mut conn, &dispatcher, &issue, recipient_id, auth_state.account_id).await;
    }

    Ok((StatusCode::OK, Json(IssueResponse::new(Issue::from_model(issue)))))
}

fn update_issue_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update issue")
        .description(
            "Edits or moves an issue. Send `null` to clear a reference. \
             A newly assigned account is notified.",
        )
        .response::<200, Json<IssueResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        issue_id = %path_params.issue_id,
    )
)]
async fn delete_issue(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<IssuePathParams>,
) -> Result<StatusCode> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::DELETE,
            Permission::DeleteTask,
        )
        .await?;

    if !conn
        .delete_issue(path_params.project_id, path_params.issue_id)
        .await?
    {
        return Err(issue_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Issue deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_issue_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete issue")
        .description("Deletes an issue. Any project member may delete issues.")
        .response_with::<204, (), _>(|res| res.description("Issue deleted."))
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for issue management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/{projectId}/issues",
            get_with(list_issues, list_issues_docs).post_with(create_issue, create_issue_docs),
        )
        .api_route(
            "/{projectId}/issues/{issueId}",
            patch_with(update_issue, update_issue_docs)
                .delete_with(delete_issue, delete_issue_docs),
        )
        .with_path_items(|item| item.tag("Issues"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assignee_is_notified() {
        let (actor, assignee) = (Uuid::now_v7(), Uuid::now_v7());
        assert_eq!(assignment_recipient(None, Some(assignee), actor), Some(assignee));
    }

    #[test]
    fn self_assignment_is_silent() {
        let actor = Uuid::now_v7();
        assert_eq!(assignment_recipient(None, Some(actor), actor), None);
    }

    #[test]
    fn unchanged_assignee_is_silent() {
        let (actor, assignee) = (Uuid::now_v7(), Uuid::now_v7());
        assert_eq!(assignment_recipient(Some(assignee), Some(assignee), actor), None);
        assert_eq!(assignment_recipient(Some(assignee), None, actor), None);
    }
}
