//! Project handlers.
//!
//! Creating a project makes the creator its administrator in the same
//! transaction. Reading requires membership; renaming and deletion are
//! administrator actions.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::{Method, StatusCode};
use sprintify_core::Permission;
use sprintify_postgres::PgError;
use sprintify_postgres::model::{NewProjectMember, Project as ProjectModel, ProjectMember};
use sprintify_postgres::query::{ProjectMemberRepository, ProjectRepository};
use sprintify_postgres::types::Pagination;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::request::{CreateProject, PaginationQuery, ProjectPathParams, UpdateProject};
use crate::handler::response::{ErrorResponse, Project, ProjectResponse, ProjectsResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for project operations.
const TRACING_TARGET: &str = "sprintify_server::handler::projects";

/// Creates a project owned by the caller.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn create_project(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    ValidateJson(request): ValidateJson<CreateProject>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating project");

    let creator_id = auth_state.account_id;
    let new_project = request.into_model(creator_id);

    let (project, membership) = conn
        .transaction(|conn| {
            Box::pin(async move {
                let project = conn.create_project(new_project).await?;
                let new_member = NewProjectMember::new_administrator(project.id, creator_id);
                let member = conn.add_project_member(new_member).await?;
                Ok::<(ProjectModel, ProjectMember), PgError>((project, member))
            })
        })
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        project_id = %project.id,
        "Project created",
    );

    let project = Project::from_model(project).with_role(membership.member_role);
    Ok((StatusCode::CREATED, Json(ProjectResponse::new(project))))
}

fn create_project_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create project")
        .description("Creates a project. The creator becomes its administrator.")
        .response::<201, Json<ProjectResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Lists the projects the caller is a member of.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn list_projects(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(pagination): Query<PaginationQuery>,
) -> Result<(StatusCode, Json<ProjectsResponse>)> {
    let pagination = Pagination::from(pagination);

    let memberships = conn
        .list_account_projects(auth_state.account_id, pagination)
        .await?;
    let total = conn.count_account_projects(auth_state.account_id).await?;

    let projects = Project::from_memberships(memberships);
    let page_info = pagination.page_info(projects.len(), total);

    tracing::debug!(
        target: TRACING_TARGET,
        project_count = projects.len(),
        "Projects listed",
    );

    Ok((StatusCode::OK, Json(ProjectsResponse::new(projects, page_info))))
}

fn list_projects_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List projects")
        .description("Returns the projects the authenticated account is a member of.")
        .response::<200, Json<ProjectsResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Reads a single project.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn read_project(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let role = auth_state
        .authorize_member(&mut conn, path_params.project_id)
        .await?;

    let Some(project) = conn.find_project_by_id(path_params.project_id).await? else {
        return Err(ErrorKind::NotFound
            .with_message("Project not found")
            .with_resource("project"));
    };

    let project = Project::from_model(project).with_role(role);
    Ok((StatusCode::OK, Json(ProjectResponse::new(project))))
}

fn read_project_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get project")
        .description("Returns a project the authenticated account is a member of.")
        .response::<200, Json<ProjectResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Updates a project's name or description.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn update_project(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<UpdateProject>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let role = auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::PATCH,
            Permission::EditProject,
        )
        .await?;

    let changes = request.into_model();
    let project = if changes.is_empty() {
        conn.find_project_by_id(path_params.project_id).await?
    } else {
        Some(conn.update_project(path_params.project_id, changes).await?)
    };

    let Some(project) = project else {
        return Err(ErrorKind::NotFound
            .with_message("Project not found")
            .with_resource("project"));
    };

    tracing::info!(target: TRACING_TARGET, "Project updated");

    let mut project = Project::from_model(project);
    if let Some(role) = role {
        project = project.with_role(role);
    }

    Ok((StatusCode::OK, Json(ProjectResponse::new(project))))
}

fn update_project_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update project")
        .description("Renames or re-describes a project. Requires the administrator role.")
        .response::<200, Json<ProjectResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Deletes a project together with everything it owns.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn delete_project(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<StatusCode> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::DELETE,
            Permission::DeleteProject,
        )
        .await?;

    if !conn.delete_project(path_params.project_id).await? {
        return Err(ErrorKind::NotFound
            .with_message("Project not found")
            .with_resource("project"));
    }

    tracing::warn!(target: TRACING_TARGET, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_project_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete project")
        .description("Deletes a project and all of its content. Requires the administrator role.")
        .response_with::<204, (), _>(|res| res.description("Project deleted."))
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for project management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/projects",
            post_with(create_project, create_project_docs)
                .get_with(list_projects, list_projects_docs),
        )
        .api_route(
            "/{projectId}",
            get_with(read_project, read_project_docs)
                .patch_with(update_project, update_project_docs)
                .delete_with(delete_project, delete_project_docs),
        )
        .with_path_items(|item| item.tag("Projects"))
}
