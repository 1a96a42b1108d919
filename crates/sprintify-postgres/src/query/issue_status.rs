//! IssueStatus repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewIssueStatus, IssueStatus, UpdateIssueStatus};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for issue statuses.
///
/// Statuses are ordered by position.
pub trait IssueStatusRepository {
    /// Lists a project's issue statuses in display order.
    fn list_project_issue_statuses(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<IssueStatus>>> + Send;

    /// Inserts an issue status.
    fn create_issue_status(
        &mut self,
        status: NewIssueStatus,
    ) -> impl Future<Output = PgResult<IssueStatus>> + Send;

    /// Applies partial changes; returns `None` if the issue status does not exist.
    fn update_issue_status(
        &mut self,
        project_id: Uuid,
        status_id: Uuid,
        changes: UpdateIssueStatus,
    ) -> impl Future<Output = PgResult<Option<IssueStatus>>> + Send;

    /// Deletes a issue status; issues referencing it are detached.
    fn delete_issue_status(
        &mut self,
        project_id: Uuid,
        status_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl IssueStatusRepository for PgConnection {
    async fn list_project_issue_statuses(&mut self, project_id: Uuid) -> PgResult<Vec<IssueStatus>> {
        use schema::issue_statuses::{self, dsl};

        issue_statuses::table
            .filter(dsl::project_id.eq(project_id))
            .order((dsl::position.asc(), dsl::created_at.asc()))
            .select(IssueStatus::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_issue_status(&mut self, status: NewIssueStatus) -> PgResult<IssueStatus> {
        use schema::issue_statuses;

        diesel::insert_into(issue_statuses::table)
            .values(&status)
            .returning(IssueStatus::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_issue_status(
        &mut self,
        project_id: Uuid,
        status_id: Uuid,
        changes: UpdateIssueStatus,
    ) -> PgResult<Option<IssueStatus>> {
        use schema::issue_statuses::{self, dsl};

        if changes.is_empty() {
            return issue_statuses::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(status_id))
                .select(IssueStatus::as_select())
                .first(self)
                .await
                .optional()
                .map_err(PgError::from);
        }

        diesel::update(
            issue_statuses::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(status_id)),
        )
        .set(&changes)
        .returning(IssueStatus::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn delete_issue_status(&mut self, project_id: Uuid, status_id: Uuid) -> PgResult<bool> {
        use schema::issue_statuses::{self, dsl};

        let deleted = diesel::delete(
            issue_statuses::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(status_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
