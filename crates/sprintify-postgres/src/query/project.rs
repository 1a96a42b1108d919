//! Project repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewProject, Project, ProjectMember, UpdateProject};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for project database operations.
pub trait ProjectRepository {
    /// Inserts a new project.
    ///
    /// The caller is responsible for adding the creator's membership in the
    /// same transaction.
    fn create_project(
        &mut self,
        project: NewProject,
    ) -> impl Future<Output = PgResult<Project>> + Send;

    /// Finds a project by its unique identifier.
    fn find_project_by_id(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Project>>> + Send;

    /// Lists the projects an account belongs to together with its membership,
    /// most recently updated first.
    fn list_account_projects(
        &mut self,
        account_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<(Project, ProjectMember)>>> + Send;

    /// Counts the projects an account belongs to.
    fn count_account_projects(&mut self, account_id: Uuid)
    -> impl Future<Output = PgResult<i64>> + Send;

    /// Applies partial changes to a project.
    fn update_project(
        &mut self,
        project_id: Uuid,
        changes: UpdateProject,
    ) -> impl Future<Output = PgResult<Project>> + Send;

    /// Deletes a project and, by cascade, everything it owns.
    ///
    /// Returns whether a row was deleted.
    fn delete_project(&mut self, project_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ProjectRepository for PgConnection {
    async fn create_project(&mut self, project: NewProject) -> PgResult<Project> {
        use schema::projects;

        diesel::insert_into(projects::table)
            .values(&project)
            .returning(Project::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_project_by_id(&mut self, project_id: Uuid) -> PgResult<Option<Project>> {
        use schema::projects::{self, dsl};

        projects::table
            .filter(dsl::id.eq(project_id))
            .select(Project::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_account_projects(
        &mut self,
        account_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<(Project, ProjectMember)>> {
        use schema::{project_members, projects};

        projects::table
            .inner_join(project_members::table)
            .filter(project_members::account_id.eq(account_id))
            .order(projects::updated_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select((Project::as_select(), ProjectMember::as_select()))
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_account_projects(&mut self, account_id: Uuid) -> PgResult<i64> {
        use schema::project_members::{self, dsl};

        project_members::table
            .filter(dsl::account_id.eq(account_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_project(&mut self, project_id: Uuid, changes: UpdateProject) -> PgResult<Project> {
        use schema::projects::{self, dsl};

        diesel::update(projects::table.filter(dsl::id.eq(project_id)))
            .set(&changes)
            .returning(Project::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_project(&mut self, project_id: Uuid) -> PgResult<bool> {
        use schema::projects::{self, dsl};

        let deleted = diesel::delete(projects::table.filter(dsl::id.eq(project_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
