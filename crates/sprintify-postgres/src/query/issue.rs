//! Issue repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{Issue, NewIssue, UpdateIssue};
use crate::{PgConnection, PgError, PgResult, schema};

/// Optional filters applied when listing issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Only issues in this sprint.
    pub sprint_id: Option<Uuid>,
    /// Only issues in this board column.
    pub column_id: Option<Uuid>,
    /// Only issues in this epic.
    pub epic_id: Option<Uuid>,
    /// Only issues assigned to this account.
    pub assignee_id: Option<Uuid>,
}

/// Builds the boxed query selecting a project's issues matching `filter`.
fn filtered_issues<'a>(
    project_id: Uuid,
    filter: IssueFilter,
) -> schema::issues::BoxedQuery<'a, diesel::pg::Pg> {
    use schema::issues::{self, dsl};

    let mut query = issues::table
        .filter(dsl::project_id.eq(project_id))
        .into_boxed();

    if let Some(sprint_id) = filter.sprint_id {
        query = query.filter(dsl::sprint_id.eq(sprint_id));
    }
    if let Some(column_id) = filter.column_id {
        query = query.filter(dsl::column_id.eq(column_id));
    }
    if let Some(epic_id) = filter.epic_id {
        query = query.filter(dsl::epic_id.eq(epic_id));
    }
    if let Some(assignee_id) = filter.assignee_id {
        query = query.filter(dsl::assignee_id.eq(assignee_id));
    }

    query
}

/// Repository for issues.
pub trait IssueRepository {
    /// Lists a project's issues matching `filter`, by position.
    fn list_project_issues(
        &mut self,
        project_id: Uuid,
        filter: IssueFilter,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Issue>>> + Send;

    /// Counts a project's issues matching `filter`.
    fn count_project_issues(
        &mut self,
        project_id: Uuid,
        filter: IssueFilter,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Inserts an issue.
    fn create_issue(&mut self, issue: NewIssue) -> impl Future<Output = PgResult<Issue>> + Send;

    /// Finds an issue within a project.
    fn find_project_issue(
        &mut self,
        project_id: Uuid,
        issue_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Issue>>> + Send;

    /// Applies partial changes; returns `None` if the issue does not exist.
    fn update_issue(
        &mut self,
        project_id: Uuid,
        issue_id: Uuid,
        changes: UpdateIssue,
    ) -> impl Future<Output = PgResult<Option<Issue>>> + Send;

    /// Deletes an issue.
    fn delete_issue(
        &mut self,
        project_id: Uuid,
        issue_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl IssueRepository for PgConnection {
    async fn list_project_issues(
        &mut self,
        project_id: Uuid,
        filter: IssueFilter,
        pagination: Pagination,
    ) -> PgResult<Vec<Issue>> {
        use schema::issues::dsl;

        filtered_issues(project_id, filter)
            .order((dsl::position.asc(), dsl::created_at.asc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Issue::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_project_issues(&mut self, project_id: Uuid, filter: IssueFilter) -> PgResult<i64> {
        filtered_issues(project_id, filter)
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_issue(&mut self, issue: NewIssue) -> PgResult<Issue> {
        use schema::issues;

        diesel::insert_into(issues::table)
            .values(&issue)
            .returning(Issue::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_project_issue(&mut self, project_id: Uuid, issue_id: Uuid) -> PgResult<Option<Issue>> {
        use schema::issues::{self, dsl};

        issues::table
            .filter(dsl::project_id.eq(project_id))
            .filter(dsl::id.eq(issue_id))
            .select(Issue::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_issue(
        &mut self,
        project_id: Uuid,
        issue_id: Uuid,
        changes: UpdateIssue,
    ) -> PgResult<Option<Issue>> {
        use schema::issues::{self, dsl};

        if changes.is_empty() {
            return issues::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(issue_id))
                .select(Issue::as_select())
                .first(self)
                .await
                .optional()
                .map_err(PgError::from);
        }

        diesel::update(
            issues::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(issue_id)),
        )
        .set(&changes)
        .returning(Issue::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn delete_issue(&mut self, project_id: Uuid, issue_id: Uuid) -> PgResult<bool> {
        use schema::issues::{self, dsl};

        let deleted = diesel::delete(
            issues::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(issue_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
