//! Issue status handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::{Method, StatusCode};
use sprintify_core::Permission;
use sprintify_postgres::query::IssueStatusRepository;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, ValidateJson};
use crate::handler::request::{CreateIssueStatus, ProjectPathParams, StatusPathParams, UpdateIssueStatus};
use crate::handler::response::{ErrorResponse, IssueStatus, IssueStatusResponse, IssueStatusesResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for issue status operations.
const TRACING_TARGET: &str = "sprintify_server::handler::statuses";

fn status_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Status not found")
        .with_resource("status")
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn list_statuses(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<(StatusCode, Json<IssueStatusesResponse>)> {
    auth_state
        .authorize_member(&mut conn, path_params.project_id)
        .await?;

    let statuses = conn.list_project_issue_statuses(path_params.project_id).await?;
    let statuses = IssueStatus::from_models(statuses);

    Ok((StatusCode::OK, Json(IssueStatusesResponse::new(statuses))))
}

fn list_statuses_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List statuses")
        .description("Returns the workflow statuses of the project in order.")
        .response::<200, Json<IssueStatusesResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn create_status(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<CreateIssueStatus>,
) -> Result<(StatusCode, Json<IssueStatusResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::POST,
            Permission::ConfigureStatus,
        )
        .await?;

    let next_position = match request.position {
        Some(_) => 0,
        None => {
            let statuses = conn.list_project_issue_statuses(path_params.project_id).await?;
            statuses.iter().map(|s| s.position + 1).max().unwrap_or(0)
        }
    };

    let new_status = request.into_model(path_params.project_id, next_position);
    let status = conn.create_issue_status(new_status).await?;

    tracing::info!(target: TRACING_TARGET, status_id = %status.id, "Status created");

    let status = IssueStatus::from_model(status);
    Ok((StatusCode::CREATED, Json(IssueStatusResponse::new(status))))
}

fn create_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create status")
        .description("Adds a workflow status. Requires the moderator role.")
        .response::<201, Json<IssueStatusResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        status_id = %path_params.status_id,
    )
)]
async fn update_status(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<StatusPathParams>,
    ValidateJson(request): ValidateJson<UpdateIssueStatus>,
) -> Result<(StatusCode, Json<IssueStatusResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::PATCH,
            Permission::ConfigureStatus,
        )
        .await?;

    let Some(status) = conn
        .update_issue_status(path_params.project_id, path_params.status_id, request.into_model())
        .await?
    else {
        return Err(status_not_found());
    };

    tracing::info!(target: TRACING_TARGET, "Status updated");

    let status = IssueStatus::from_model(status);
    Ok((StatusCode::OK, Json(IssueStatusResponse::new(status))))
}

fn update_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update status")
        .response::<200, Json<IssueStatusResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        status_id = %path_params.status_id,
    )
)]
async fn delete_status(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<StatusPathParams>,
) -> Result<StatusCode> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::DELETE,
            Permission::ConfigureStatus,
        )
        .await?;

    if !conn
        .delete_issue_status(path_params.project_id, path_params.status_id)
        .await?
    {
        return Err(status_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Status deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete status")
        .response_with::<204, (), _>(|res| res.description("Status deleted."))
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for workflow status configuration.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/{projectId}/statuses",
            get_with(list_statuses, list_statuses_docs).post_with(create_status, create_status_docs),
        )
        .api_route(
            "/{projectId}/statuses/{statusId}",
            patch_with(update_status, update_status_docs)
                .delete_with(delete_status, delete_status_docs),
        )
        .with_path_items(|item| item.tag("Statuses"))
}
