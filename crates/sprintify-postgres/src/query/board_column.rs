//! BoardColumn repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewBoardColumn, BoardColumn, UpdateBoardColumn};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for board columns.
///
/// Board columns are ordered by position.
pub trait BoardColumnRepository {
    /// Lists a project's board columns in display order.
    fn list_project_board_columns(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<BoardColumn>>> + Send;

    /// Inserts a board column.
    fn create_board_column(
        &mut self,
        column: NewBoardColumn,
    ) -> impl Future<Output = PgResult<BoardColumn>> + Send;

    /// Applies partial changes; returns `None` if the board column does not exist.
    fn update_board_column(
        &mut self,
        project_id: Uuid,
        column_id: Uuid,
        changes: UpdateBoardColumn,
    ) -> impl Future<Output = PgResult<Option<BoardColumn>>> + Send;

    /// Deletes a board column; issues referencing it are detached.
    fn delete_board_column(
        &mut self,
        project_id: Uuid,
        column_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl BoardColumnRepository for PgConnection {
    async fn list_project_board_columns(&mut self, project_id: Uuid) -> PgResult<Vec<BoardColumn>> {
        use schema::board_columns::{self, dsl};

        board_columns::table
            .filter(dsl::project_id.eq(project_id))
            .order((dsl::position.asc(), dsl::created_at.asc()))
            .select(BoardColumn::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_board_column(&mut self, column: NewBoardColumn) -> PgResult<BoardColumn> {
        use schema::board_columns;

        diesel::insert_into(board_columns::table)
            .values(&column)
            .returning(BoardColumn::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_board_column(
        &mut self,
        project_id: Uuid,
        column_id: Uuid,
        changes: UpdateBoardColumn,
    ) -> PgResult<Option<BoardColumn>> {
        use schema::board_columns::{self, dsl};

        if changes.is_empty() {
            return board_columns::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(column_id))
                .select(BoardColumn::as_select())
                .first(self)
                .await
                .optional()
                .map_err(PgError::from);
        }

        diesel::update(
            board_columns::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(column_id)),
        )
        .set(&changes)
        .returning(BoardColumn::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn delete_board_column(&mut self, project_id: Uuid, column_id: Uuid) -> PgResult<bool> {
        use schema::board_columns::{self, dsl};

        let deleted = diesel::delete(
            board_columns::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(column_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
