//! Board column handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::{Method, StatusCode};
use sprintify_core::Permission;
use sprintify_postgres::query::BoardColumnRepository;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, ValidateJson};
use crate::handler::request::{ColumnPathParams, CreateBoardColumn, ProjectPathParams, UpdateBoardColumn};
use crate::handler::response::{BoardColumn, BoardColumnResponse, BoardColumnsResponse, ErrorResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for board column operations.
const TRACING_TARGET: &str = "sprintify_server::handler::board_columns";

fn column_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Board column not found")
        .with_resource("board column")
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn list_columns(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<(StatusCode, Json<BoardColumnsResponse>)> {
    auth_state
        .authorize_member(&mut conn, path_params.project_id)
        .await?;

    let columns = conn.list_project_board_columns(path_params.project_id).await?;
    let columns = BoardColumn::from_models(columns);

    Ok((StatusCode::OK, Json(BoardColumnsResponse::new(columns))))
}

fn list_columns_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List board columns")
        .description("Returns the board columns of the project from left to right.")
        .response::<200, Json<BoardColumnsResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn create_column(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<CreateBoardColumn>,
) -> Result<(StatusCode, Json<BoardColumnResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::POST,
            Permission::ConfigureBoard,
        )
        .await?;

    let next_position = match request.position {
        Some(_) => 0,
        None => {
            let columns = conn.list_project_board_columns(path_params.project_id).await?;
            columns.iter().map(|c| c.position + 1).max().unwrap_or(0)
        }
    };

    let new_column = request.into_model(path_params.project_id, next_position);
    let column = conn.create_board_column(new_column).await?;

    tracing::info!(target: TRACING_TARGET, column_id = %column.id, "Board column created");

    let column = BoardColumn::from_model(column);
    Ok((StatusCode::CREATED, Json(BoardColumnResponse::new(column))))
}

fn create_column_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create board column")
        .description("Adds a column to the board. Requires the moderator role.")
        .response::<201, Json<BoardColumnResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        column_id = %path_params.column_id,
    )
)]
async fn update_column(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ColumnPathParams>,
    ValidateJson(request): ValidateJson<UpdateBoardColumn>,
) -> Result<(StatusCode, Json<BoardColumnResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::PATCH,
            Permission::ConfigureBoard,
        )
        .await?;

    let Some(column) = conn
        .update_board_column(path_params.project_id, path_params.column_id, request.into_model())
        .await?
    else {
        return Err(column_not_found());
    };

    tracing::info!(target: TRACING_TARGET, "Board column updated");

    let column = BoardColumn::from_model(column);
    Ok((StatusCode::OK, Json(BoardColumnResponse::new(column))))
}

fn update_column_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update board column")
        .response::<200, Json<BoardColumnResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        column_id = %path_params.column_id,
    )
)]
async fn delete_column(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ColumnPathParams>,
) -> Result<StatusCode> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::DELETE,
            Permission::ConfigureBoard,
        )
        .await?;

    if !conn
        .delete_board_column(path_params.project_id, path_params.column_id)
        .await?
    {
        return Err(column_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Board column deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_column_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete board column")
        .response_with::<204, (), _>(|res| res.description("Board column deleted."))
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for board configuration.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/{projectId}/board-columns",
            get_with(list_columns, list_columns_docs).post_with(create_column, create_column_docs),
        )
        .api_route(
            "/{projectId}/board-columns/{columnId}",
            patch_with(update_column, update_column_docs)
                .delete_with(delete_column, delete_column_docs),
        )
        .with_path_items(|item| item.tag("Board"))
}
