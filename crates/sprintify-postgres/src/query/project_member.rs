//! Project member repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Account, NewProjectMember, ProjectMember, UpdateProjectMember};
use crate::types::ProjectRole;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for project membership.
///
/// The membership row is the single source of an account's role in a project.
pub trait ProjectMemberRepository {
    /// Adds a member to a project.
    ///
    /// Fails with a unique violation if the account is already a member.
    fn add_project_member(
        &mut self,
        member: NewProjectMember,
    ) -> impl Future<Output = PgResult<ProjectMember>> + Send;

    /// Finds the membership of an account in a project.
    fn find_project_member(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<ProjectMember>>> + Send;

    /// Returns the role an account holds in a project, if any.
    fn find_member_role(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<ProjectRole>>> + Send;

    /// Lists all members of a project with their accounts, highest role first.
    fn list_project_members(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<(ProjectMember, Account)>>> + Send;

    /// Lists the account ids of every member of a project.
    fn list_member_account_ids(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Uuid>>> + Send;

    /// Counts the administrators of a project.
    fn count_administrators(&mut self, project_id: Uuid)
    -> impl Future<Output = PgResult<i64>> + Send;

    /// Sets a member's role.
    fn update_project_member(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
        changes: UpdateProjectMember,
    ) -> impl Future<Output = PgResult<ProjectMember>> + Send;

    /// Removes a member from a project.
    ///
    /// Returns whether a row was deleted.
    fn remove_project_member(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ProjectMemberRepository for PgConnection {
    async fn add_project_member(&mut self, member: NewProjectMember) -> PgResult<ProjectMember> {
        use schema::project_members;

        diesel::insert_into(project_members::table)
            .values(&member)
            .returning(ProjectMember::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_project_member(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> PgResult<Option<ProjectMember>> {
        use schema::project_members::{self, dsl};

        project_members::table
            .filter(dsl::project_id.eq(project_id))
            .filter(dsl::account_id.eq(account_id))
            .select(ProjectMember::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_member_role(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> PgResult<Option<ProjectRole>> {
        use schema::project_members::{self, dsl};

        project_members::table
            .filter(dsl::project_id.eq(project_id))
            .filter(dsl::account_id.eq(account_id))
            .select(dsl::member_role)
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_project_members(
        &mut self,
        project_id: Uuid,
    ) -> PgResult<Vec<(ProjectMember, Account)>> {
        use schema::{accounts, project_members};

        project_members::table
            .inner_join(accounts::table)
            .filter(project_members::project_id.eq(project_id))
            .order((
                project_members::member_role.desc(),
                project_members::created_at.asc(),
            ))
            .select((ProjectMember::as_select(), Account::as_select()))
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_member_account_ids(&mut self, project_id: Uuid) -> PgResult<Vec<Uuid>> {
        use schema::project_members::{self, dsl};

        project_members::table
            .filter(dsl::project_id.eq(project_id))
            .select(dsl::account_id)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_administrators(&mut self, project_id: Uuid) -> PgResult<i64> {
        use schema::project_members::{self, dsl};

        project_members::table
            .filter(dsl::project_id.eq(project_id))
            .filter(dsl::member_role.eq(ProjectRole::Administrator))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_project_member(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
        changes: UpdateProjectMember,
    ) -> PgResult<ProjectMember> {
        use schema::project_members::{self, dsl};

        diesel::update(
            project_members::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::account_id.eq(account_id)),
        )
        .set(&changes)
        .returning(ProjectMember::as_returning())
        .get_result(self)
        .await
        .map_err(PgError::from)
    }

    async fn remove_project_member(&mut self, project_id: Uuid, account_id: Uuid) -> PgResult<bool> {
        use schema::project_members::{self, dsl};

        let deleted = diesel::delete(
            project_members::table
                .filter(dsl::project_id.eq(project_id))
                .filter(dsl::account_id.eq(account_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
