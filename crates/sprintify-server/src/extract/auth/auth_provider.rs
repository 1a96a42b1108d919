//! Project authorization for authenticated callers.

use axum::http::Method;
use sprintify_core::{Permission, ProjectRole};
use uuid::Uuid;

use crate::handler::{Error, ErrorKind, Result};
use crate::service::{GateDecision, RoleResolver, authorize, require_member};

/// Authorization helpers for anything that knows the caller's account.
///
/// Every method short-circuits with `403 Forbidden` before the caller does
/// any work.
pub trait AuthProvider {
    /// Returns the account id of the authenticated caller.
    fn account_id(&self) -> Uuid;

    /// Runs the authorization gate for `permission` on `method`.
    ///
    /// Returns the caller's role when the gate resolved one; read verbs pass
    /// without a lookup and return `None`.
    #[allow(async_fn_in_trait)]
    async fn authorize_project<R>(
        &self,
        resolver: &mut R,
        project_id: Uuid,
        method: &Method,
        permission: Permission,
    ) -> Result<Option<ProjectRole>>
    where
        R: RoleResolver + ?Sized,
    {
        let decision = authorize(resolver, self.account_id(), project_id, method, permission).await?;
        decision_into_result(decision)
    }

    /// Requires membership of `project_id` and returns the caller's role.
    #[allow(async_fn_in_trait)]
    async fn authorize_member<R>(&self, resolver: &mut R, project_id: Uuid) -> Result<ProjectRole>
    where
        R: RoleResolver + ?Sized,
    {
        require_member(resolver, self.account_id(), project_id)
            .await?
            .ok_or_else(|| {
                ErrorKind::Forbidden
                    .with_message("Not a project member")
                    .with_resource("project")
            })
    }
}

fn decision_into_result(decision: GateDecision) -> Result<Option<ProjectRole>> {
    match decision {
        GateDecision::Allow { role } => Ok(role),
        GateDecision::Forbidden { reason } => Err(Error::new(ErrorKind::Forbidden)
            .with_message(reason)
            .with_resource("project")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::FakeRoles;

    struct Caller(Uuid);

    impl AuthProvider for Caller {
        fn account_id(&self) -> Uuid {
            self.0
        }
    }

    #[tokio::test]
    async fn member_denied_sprint_deletion() {
        let (project, account) = (Uuid::now_v7(), Uuid::now_v7());
        let mut roles = FakeRoles::default().with(project, account, ProjectRole::Member);

        let error = Caller(account)
            .authorize_project(&mut roles, project, &Method::DELETE, Permission::DeleteSprint)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert!(error.message().unwrap_or_default().contains("MODERATOR"));
    }

    #[tokio::test]
    async fn moderator_allowed_sprint_deletion() {
        let (project, account) = (Uuid::now_v7(), Uuid::now_v7());
        let mut roles = FakeRoles::default().with(project, account, ProjectRole::Moderator);

        let role = Caller(account)
            .authorize_project(&mut roles, project, &Method::DELETE, Permission::DeleteSprint)
            .await
            .unwrap();

        assert_eq!(role, Some(ProjectRole::Moderator));
    }

    #[tokio::test]
    async fn outsider_is_not_a_member() {
        let mut roles = FakeRoles::default();

        let error = Caller(Uuid::now_v7())
            .authorize_member(&mut roles, Uuid::now_v7())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Forbidden);
    }
}
