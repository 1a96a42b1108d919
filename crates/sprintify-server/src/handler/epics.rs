//! Epic handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::{Method, StatusCode};
use sprintify_core::Permission;
use sprintify_postgres::query::EpicRepository;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, ValidateJson};
use crate::handler::request::{CreateEpic, EpicPathParams, ProjectPathParams, UpdateEpic};
use crate::handler::response::{Epic, EpicResponse, EpicsResponse, ErrorResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for epic operations.
const TRACING_TARGET: &str = "sprintify_server::handler::epics";

fn epic_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Epic not found")
        .with_resource("epic")
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn list_epics(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<(StatusCode, Json<EpicsResponse>)> {
    auth_state
        .authorize_member(&mut conn, path_params.project_id)
        .await?;

    let epics = conn.list_project_epics(path_params.project_id).await?;
    Ok((StatusCode::OK, Json(EpicsResponse::new(Epic::from_models(epics)))))
}

fn list_epics_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List epics")
        .response::<200, Json<EpicsResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn create_epic(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<CreateEpic>,
) -> Result<(StatusCode, Json<EpicResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::POST,
            Permission::CreateEpic,
        )
        .await?;

    let new_epic = request.into_model(path_params.project_id, auth_state.account_id);
    let epic = conn.create_epic(new_epic).await?;

    tracing::info!(target: TRACING_TARGET, epic_id = %epic.id, "Epic created");

    Ok((StatusCode::CREATED, Json(EpicResponse::new(Epic::from_model(epic)))))
}

fn create_epic_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create epic")
        .response::<201, Json<EpicResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        epic_id = %path_params.epic_id,
    )
)]
async fn update_epic(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<EpicPathParams>,
    ValidateJson(request): ValidateJson<UpdateEpic>,
) -> Result<(StatusCode, Json<EpicResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::PATCH,
            Permission::UpdateEpic,
        )
        .await?;

    let Some(epic) = conn
        .update_epic(path_params.project_id, path_params.epic_id, request.into_model())
        .await?
    else {
        return Err(epic_not_found());
    };

    tracing::info!(target: TRACING_TARGET, "Epic updated");

    Ok((StatusCode::OK, Json(EpicResponse::new(Epic::from_model(epic)))))
}

fn update_epic_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update epic")
        .response::<200, Json<EpicResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        epic_id = %path_params.epic_id,
    )
)]
async fn delete_epic(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<EpicPathParams>,
) -> Result<StatusCode> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::DELETE,
            Permission::DeleteEpic,
        )
        .await?;

    if !conn
        .delete_epic(path_params.project_id, path_params.epic_id)
        .await?
    {
        return Err(epic_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Epic deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_epic_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete epic")
        .description("Deletes an epic. Its issues stay on the board without an epic.")
        .response_with::<204, (), _>(|res| res.description("Epic deleted."))
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for epic management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/{projectId}/epics",
            get_with(list_epics, list_epics_docs).post_with(create_epic, create_epic_docs),
        )
        .api_route(
            "/{projectId}/epics/{epicId}",
            patch_with(update_epic, update_epic_docs).delete_with(delete_epic, delete_epic_docs),
        )
        .with_path_items(|item| item.tag("Epics"))
}
