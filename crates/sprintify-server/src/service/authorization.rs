//! Role resolution and the project authorization gate.
//!
//! Every mutating project endpoint passes through [`authorize`] before any
//! business logic runs. Reads only require membership, see [`require_member`].

use std::borrow::Cow;
use std::future::Future;

use axum::http::Method;
use sprintify_core::{Permission, ProjectRole, can};
use sprintify_postgres::query::ProjectMemberRepository;
use sprintify_postgres::{PgConn, PgConnection, PgResult};
use uuid::Uuid;

use crate::TRACING_TARGET_AUTHORIZATION;

/// Looks up the role an account holds in a project.
///
/// `Ok(None)` means the account is not a member and holds no permissions.
pub trait RoleResolver: Send {
    /// Returns the role of `account_id` in `project_id`, if it is a member.
    fn resolve_role(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<ProjectRole>>> + Send;
}

impl RoleResolver for PgConnection {
    async fn resolve_role(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> PgResult<Option<ProjectRole>> {
        self.find_member_role(project_id, account_id).await
    }
}

impl RoleResolver for PgConn {
    async fn resolve_role(
        &mut self,
        project_id: Uuid,
        account_id: Uuid,
    ) -> PgResult<Option<ProjectRole>> {
        let conn: &mut PgConnection = self;
        conn.find_member_role(project_id, account_id).await
    }
}

/// Outcome of the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The request may proceed.
    ///
    /// `role` is `None` for read requests, which never consult the matrix.
    Allow { role: Option<ProjectRole> },
    /// The request must be rejected before any work is done.
    Forbidden { reason: Cow<'static, str> },
}

impl GateDecision {
    /// Returns `true` if the request may proceed.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// Returns `true` for verbs that never change state.
#[inline]
pub fn is_read_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Decides whether `account_id` may perform `permission` in `project_id`.
///
/// Read verbs are allowed without resolving a role. For every other verb the
/// role is resolved and checked against the permission matrix; missing
/// membership denies.
pub async fn authorize<R>(
    resolver: &mut R,
    account_id: Uuid,
    project_id: Uuid,
    method: &Method,
    permission: Permission,
) -> PgResult<GateDecision>
where
    R: RoleResolver + ?Sized,
{
    if is_read_method(method) {
        return Ok(GateDecision::Allow { role: None });
    }

    let role = resolver.resolve_role(project_id, account_id).await?;
    if can(role, permission) {
        tracing::debug!(
            target: TRACING_TARGET_AUTHORIZATION,
            account_id = %account_id,
            project_id = %project_id,
            permission = %permission,
            role = ?role,
            "access granted"
        );
        return Ok(GateDecision::Allow { role });
    }

    let reason = match role {
        None => Cow::Borrowed("Not a project member"),
        Some(role) => Cow::Owned(format!(
            "Role {role} is not allowed to {permission}, {minimum} or higher required",
            minimum = permission.minimum_required_role(),
        )),
    };

    tracing::warn!(
        target: TRACING_TARGET_AUTHORIZATION,
        account_id = %account_id,
        project_id = %project_id,
        permission = %permission,
        role = ?role,
        "access denied"
    );

    Ok(GateDecision::Forbidden { reason })
}

/// Resolves the caller's role for read access, which only requires membership.
pub async fn require_member<R>(
    resolver: &mut R,
    account_id: Uuid,
    project_id: Uuid,
) -> PgResult<Option<ProjectRole>>
where
    R: RoleResolver + ?Sized,
{
    let role = resolver.resolve_role(project_id, account_id).await?;
    if role.is_none() {
        tracing::warn!(
            target: TRACING_TARGET_AUTHORIZATION,
            account_id = %account_id,
            project_id = %project_id,
            "read denied: not a project member"
        );
    }

    Ok(role)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use strum::IntoEnumIterator;

    use super::*;

    /// In-memory membership table that records how often it was consulted.
    #[derive(Debug, Default)]
    pub(crate) struct FakeRoles {
        pub roles: HashMap<(Uuid, Uuid), ProjectRole>,
        pub lookups: usize,
    }

    impl FakeRoles {
        pub fn with(mut self, project_id: Uuid, account_id: Uuid, role: ProjectRole) -> Self {
            self.roles.insert((project_id, account_id), role);
            self
        }
    }

    impl RoleResolver for FakeRoles {
        async fn resolve_role(
            &mut self,
            project_id: Uuid,
            account_id: Uuid,
        ) -> PgResult<Option<ProjectRole>> {
            self.lookups += 1;
            Ok(self.roles.get(&(project_id, account_id)).copied())
        }
    }

    #[tokio::test]
    async fn reads_never_consult_the_matrix() -> PgResult<()> {
        let mut roles = FakeRoles::default();
        let (account, project) = (Uuid::now_v7(), Uuid::now_v7());

        for permission in Permission::iter() {
            let decision =
                authorize(&mut roles, account, project, &Method::GET, permission).await?;
            assert_eq!(decision, GateDecision::Allow { role: None });
        }

        assert_eq!(roles.lookups, 0);
        Ok(())
    }

    #[tokio::test]
    async fn member_cannot_delete_sprint() -> PgResult<()> {
        let (account, project) = (Uuid::now_v7(), Uuid::now_v7());
        let mut roles = FakeRoles::default().with(project, account, ProjectRole::Member);

        let decision = authorize(
            &mut roles,
            account,
            project,
            &Method::DELETE,
            Permission::DeleteSprint,
        )
        .await?;
        assert!(!decision.is_allowed());

        let decision = authorize(
            &mut roles,
            account,
            project,
            &Method::DELETE,
            Permission::DeleteTask,
        )
        .await?;
        assert_eq!(
            decision,
            GateDecision::Allow {
                role: Some(ProjectRole::Member)
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn moderator_can_delete_sprint() -> PgResult<()> {
        let (account, project) = (Uuid::now_v7(), Uuid::now_v7());
        let mut roles = FakeRoles::default().with(project, account, ProjectRole::Moderator);

        let decision = authorize(
            &mut roles,
            account,
            project,
            &Method::DELETE,
            Permission::DeleteSprint,
        )
        .await?;
        assert!(decision.is_allowed());
        Ok(())
    }

    #[tokio::test]
    async fn non_member_is_denied_everything() -> PgResult<()> {
        let mut roles = FakeRoles::default();
        let (account, project) = (Uuid::now_v7(), Uuid::now_v7());

        for permission in Permission::iter() {
            let decision =
                authorize(&mut roles, account, project, &Method::POST, permission).await?;
            assert_eq!(
                decision,
                GateDecision::Forbidden {
                    reason: "Not a project member".into()
                }
            );
        }

        assert_eq!(require_member(&mut roles, account, project).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn membership_is_per_project() -> PgResult<()> {
        let (account, first, second) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let mut roles = FakeRoles::default().with(first, account, ProjectRole::Administrator);

        let allowed = authorize(
            &mut roles,
            account,
            first,
            &Method::PATCH,
            Permission::EditProject,
        )
        .await?;
        let denied = authorize(
            &mut roles,
            account,
            second,
            &Method::PATCH,
            Permission::EditProject,
        )
        .await?;

        assert!(allowed.is_allowed());
        assert!(!denied.is_allowed());
        Ok(())
    }
}
