//! Sprint repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewSprint, Sprint, UpdateSprint};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for sprints.
pub trait SprintRepository {
    /// Lists a project's sprints, earliest start first, unscheduled last.
    fn list_project_sprints(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Sprint>>> + Send;

    /// Inserts a sprint in the `PLANNED` state.
    fn create_sprint(&mut self, sprint: NewSprint) -> impl Future<Output = PgResult<Sprint>> + Send;

    /// Finds a sprint within a project.
    fn find_project_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Sprint>>> + Send;

    /// Applies partial changes; returns `None` if the sprint does not exist.
    fn update_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
        changes: UpdateSprint,
    ) -> impl Future<Output = PgResult<Option<Sprint>>> + Send;

    /// Deletes a sprint; its issues return to the backlog.
    fn delete_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl SprintRepository for PgConnection {
    async fn list_project_sprints(&mut self, project_id: Uuid) -> PgResult<Vec<Sprint>> {
        use schema::sprints::{self, dsl};

        sprints::table
            .filter(dsl::project_id.eq(project_id))
            .order((dsl::starts_at.asc().nulls_last(), dsl::created_at.asc()))
            .select(Sprint::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_sprint(&mut self, sprint: NewSprint) -> PgResult<Sprint> {
        use schema::sprints;

        diesel::insert_into(sprints::table)
            .values(&sprint)
            .returning(Sprint::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_project_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
    ) -> PgResult<Option<Sprint>> {
        use schema::sprints::{self, dsl};

        sprints::table
            .filter(dsl::project_id.eq(project_id))
            .filter(dsl::id.eq(sprint_id))
            .select(Sprint::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
        changes: UpdateSprint,
    ) -> PgResult<Option<Sprint>> {
        use schema::sprints::{self, dsl};

        if changes.is_empty() {
            return sprints::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(sprint_id))
                .select(Sprint::as_select())
                .first(self)
                .await
                .optional()
                .map_err(PgError::from);
        }

        diesel::update(
            sprints::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(sprint_id)),
        )
        .set(&changes)
        .returning(Sprint::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn delete_sprint(&mut self, project_id: Uuid, sprint_id: Uuid) -> PgResult<bool> {
        use schema::sprints::{self, dsl};

        let deleted = diesel::delete(
            sprints::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(sprint_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
