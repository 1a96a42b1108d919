//! Epic repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Epic, NewEpic, UpdateEpic};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for epics.
///
/// Every lookup is scoped by project so an id from another project never matches.
pub trait EpicRepository {
    /// Lists a project's epics, oldest first.
    fn list_project_epics(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Epic>>> + Send;

    /// Inserts an epic.
    fn create_epic(&mut self, epic: NewEpic) -> impl Future<Output = PgResult<Epic>> + Send;

    /// Finds an epic within a project.
    fn find_project_epic(
        &mut self,
        project_id: Uuid,
        epic_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Epic>>> + Send;

    /// Applies partial changes; returns `None` if the epic does not exist.
    fn update_epic(
        &mut self,
        project_id: Uuid,
        epic_id: Uuid,
        changes: UpdateEpic,
    ) -> impl Future<Output = PgResult<Option<Epic>>> + Send;

    /// Deletes an epic; issues keep existing without it.
    fn delete_epic(
        &mut self,
        project_id: Uuid,
        epic_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl EpicRepository for PgConnection {
    async fn list_project_epics(&mut self, project_id: Uuid) -> PgResult<Vec<Epic>> {
        use schema::epics::{self, dsl};

        epics::table
            .filter(dsl::project_id.eq(project_id))
            .order(dsl::created_at.asc())
            .select(Epic::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_epic(&mut self, epic: NewEpic) -> PgResult<Epic> {
        use schema::epics;

        diesel::insert_into(epics::table)
            .values(&epic)
            .returning(Epic::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_project_epic(&mut self, project_id: Uuid, epic_id: Uuid) -> PgResult<Option<Epic>> {
        use schema::epics::{self, dsl};

        epics::table
            .filter(dsl::project_id.eq(project_id))
            .filter(dsl::id.eq(epic_id))
            .select(Epic::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_epic(
        &mut self,
        project_id: Uuid,
        epic_id: Uuid,
        changes: UpdateEpic,
    ) -> PgResult<Option<Epic>> {
        use schema::epics::{self, dsl};

        if changes.is_empty() {
            return epics::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(epic_id))
                .select(Epic::as_select())
                .first(self)
                .await
                .optional()
                .map_err(PgError::from);
        }

        diesel::update(
            epics::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(epic_id)),
        )
        .set(&changes)
        .returning(Epic::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn delete_epic(&mut self, project_id: Uuid, epic_id: Uuid) -> PgResult<bool> {
        use schema::epics::{self, dsl};

        let deleted = diesel::delete(
            epics::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::id.eq(epic_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
