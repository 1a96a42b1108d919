//! Project member handlers.
//!
//! Role changes and removals re-read the membership inside a `SERIALIZABLE`
//! transaction, so two concurrent demotions can never both pass the
//! last-administrator guard. Both are judged by [`evaluate_role_change`] and
//! [`evaluate_member_removal`] rather than the generic gate, so that the
//! last-administrator reason wins over a missing permission.

use std::future::Future;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use serde_json::json;
use sprintify_core::{
    NotificationPriority, NotificationType, Permission, ProjectRole, RoleChange, RoleChangeDenial,
    evaluate_member_removal, evaluate_role_change,
};
use sprintify_postgres::model::{NewNotification, NewProjectMember, ProjectMember, UpdateProjectMember};
use sprintify_postgres::query::{AccountRepository, ProjectMemberRepository, ProjectRepository};
use sprintify_postgres::{PgConn, PgConnection, PgError, PgResult};
use uuid::Uuid;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, ValidateJson};
use crate::handler::request::{InviteMember, MemberPathParams, ProjectPathParams, UpdateMemberRole};
use crate::handler::response::{ErrorResponse, Member, MemberResponse, MembersResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{NotificationDispatcher, RoleResolver, ServiceState, SessionRegistry};

/// Tracing target for project member operations.
const TRACING_TARGET: &str = "sprintify_server::handler::members";

/// Outcome of a membership mutation evaluated inside a transaction.
enum MembershipChange {
    Applied(ProjectMember),
    Removed,
    Missing,
    Denied(RoleChangeDenial),
}

/// Membership reads that role changes and removals are judged on.
trait MembershipLedger: RoleResolver {
    /// Returns the number of administrators in the project.
    fn administrator_count(&mut self, project_id: Uuid)
    -> impl Future<Output = PgResult<i64>> + Send;
}

impl MembershipLedger for PgConnection {
    async fn administrator_count(&mut self, project_id: Uuid) -> PgResult<i64> {
        self.count_administrators(project_id).await
    }
}

/// Judges changing the role of `account_id` to `requested`.
///
/// Returns `None` when the account is not a member.
async fn judge_role_change<L>(
    ledger: &mut L,
    actor_role: ProjectRole,
    project_id: Uuid,
    account_id: Uuid,
    requested: ProjectRole,
) -> PgResult<Option<RoleChange>>
where
    L: MembershipLedger + ?Sized,
{
    let Some(current) = ledger.resolve_role(project_id, account_id).await? else {
        return Ok(None);
    };

    let administrators = ledger.administrator_count(project_id).await?;
    Ok(Some(evaluate_role_change(
        actor_role,
        current,
        requested,
        usize::try_from(administrators).unwrap_or(0),
    )))
}

/// Judges removing `account_id` from the project.
///
/// Returns `None` when the account is not a member.
async fn judge_member_removal<L>(
    ledger: &mut L,
    actor_role: ProjectRole,
    project_id: Uuid,
    account_id: Uuid,
    is_self: bool,
) -> PgResult<Option<RoleChange>>
where
    L: MembershipLedger + ?Sized,
{
    let Some(target) = ledger.resolve_role(project_id, account_id).await? else {
        return Ok(None);
    };

    let administrators = ledger.administrator_count(project_id).await?;
    Ok(Some(evaluate_member_removal(
        actor_role,
        target,
        is_self,
        usize::try_from(administrators).unwrap_or(0),
    )))
}

fn denial_into_error(denial: RoleChangeDenial) -> Error<'static> {
    let kind = match denial {
        RoleChangeDenial::LastAdministrator => ErrorKind::Conflict,
        RoleChangeDenial::MissingPermission
        | RoleChangeDenial::InsufficientRank
        | RoleChangeDenial::RoleAboveActor => ErrorKind::Forbidden,
    };

    kind.with_message(denial.reason()).with_resource("member")
}

fn member_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Project member not found")
        .with_resource("member")
}

async fn project_name(conn: &mut PgConn, project_id: Uuid) -> String {
    match conn.find_project_by_id(project_id).await {
        Ok(Some(project)) => project.display_name,
        _ => "a project".to_owned(),
    }
}

/// Lists every member of a project.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn list_members(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<(StatusCode, Json<MembersResponse>)> {
    auth_state
        .authorize_member(&mut conn, path_params.project_id)
        .await?;

    let rows = conn.list_project_members(path_params.project_id).await?;
    let members = Member::from_models(rows);

    tracing::debug!(
        target: TRACING_TARGET,
        member_count = members.len(),
        "Project members listed",
    );

    Ok((StatusCode::OK, Json(MembersResponse::new(members))))
}

fn list_members_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List members")
        .description("Returns all members of the project with their roles.")
        .response::<200, Json<MembersResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

/// Adds an existing account to the project and notifies it.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn invite_member(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<InviteMember>,
) -> Result<(StatusCode, Json<MemberResponse>)> {
    let project_id = path_params.project_id;
    let actor_role = auth_state
        .authorize_project(&mut conn, project_id, &Method::POST, Permission::InviteMember)
        .await?
        .unwrap_or_default();

    let role = request.role();
    if role.rank() > actor_role.rank() {
        return Err(denial_into_error(RoleChangeDenial::RoleAboveActor));
    }

    let email = request.email.trim().to_lowercase();
    let Some(account) = conn.find_account_by_email(&email).await? else {
        return Err(ErrorKind::NotFound
            .with_message("No account is registered with this email address")
            .with_resource("account"));
    };

    if conn.find_project_member(project_id, account.id).await?.is_some() {
        return Err(ErrorKind::Conflict
            .with_message("Account is already a member of this project")
            .with_resource("member"));
    }

    let member = conn
        .add_project_member(NewProjectMember::new(project_id, account.id, role))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        invitee_id = %account.id,
        role = %role,
        "Member invited",
    );

    let project_name = project_name(&mut conn, project_id).await;
    let notification = NewNotification {
        recipient_id: account.id,
        sender_id: Some(auth_state.account_id),
        project_id: Some(project_id),
        notify_type: NotificationType::ProjectInvitation,
        priority: NotificationPriority::High,
        title: format!("You were added to {project_name}"),
        message: format!("You joined {project_name} as {role}."),
        metadata: json!({ "projectId": project_id, "role": role }),
        action_url: Some(format!("/projects/{project_id}")),
    };

    if let Err(error) = dispatcher.notify(&mut conn, notification).await {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %error,
            invitee_id = %account.id,
            "Invitation notification not created",
        );
    }

    let member = Member::from_model_with_account(member, account);
    Ok((StatusCode::CREATED, Json(MemberResponse::new(member))))
}

fn invite_member_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Invite member")
        .description(
            "Adds the account registered under the given email to the project. \
             The invitee is notified and emailed.",
        )
        .response::<201, Json<MemberResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Changes a member's role.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        member_id = %path_params.account_id,
    )
)]
async fn update_member(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<MemberPathParams>,
    ValidateJson(request): ValidateJson<UpdateMemberRole>,
) -> Result<(StatusCode, Json<MemberResponse>)> {
    let MemberPathParams {
        project_id,
        account_id,
    } = path_params;

    // EDIT_ROLE is checked by the role-change policy, after the
    // last-administrator guard.
    let actor_role = auth_state.authorize_member(&mut conn, project_id).await?;

    let requested = request.role;
    let change = conn
        .serializable_transaction(|conn| {
            Box::pin(async move {
                let Some(decision) =
                    judge_role_change(conn, actor_role, project_id, account_id, requested).await?
                else {
                    return Ok::<_, PgError>(MembershipChange::Missing);
                };

                if let Err(denial) = decision.into_result() {
                    return Ok(MembershipChange::Denied(denial));
                }

                let changes = UpdateProjectMember {
                    member_role: Some(requested),
                };
                let member = conn
                    .update_project_member(project_id, account_id, changes)
                    .await?;
                Ok(MembershipChange::Applied(member))
            })
        })
        .await?;

    let member = match change {
        MembershipChange::Applied(member) => member,
        MembershipChange::Missing | MembershipChange::Removed => return Err(member_not_found()),
        MembershipChange::Denied(denial) => {
            tracing::warn!(
                target: TRACING_TARGET,
                denial = ?denial,
                requested = %requested,
                "Role change denied",
            );
            return Err(denial_into_error(denial));
        }
    };

    tracing::info!(
        target: TRACING_TARGET,
        role = %member.member_role,
        "Member role changed",
    );

    let project_name = project_name(&mut conn, project_id).await;
    let notification = NewNotification {
        recipient_id: account_id,
        sender_id: Some(auth_state.account_id),
        project_id: Some(project_id),
        notify_type: NotificationType::RoleChanged,
        priority: NotificationPriority::Medium,
        title: format!("Your role in {project_name} changed"),
        message: format!("You are now {requested} in {project_name}."),
        metadata: json!({ "projectId": project_id, "role": requested }),
        action_url: Some(format!("/projects/{project_id}")),
    };

    if let Err(error) = dispatcher.notify(&mut conn, notification).await {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %error,
            "Role change notification not created",
        );
    }

    Ok((StatusCode::OK, Json(MemberResponse::new(Member::from_model(member)))))
}

fn update_member_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Change member role")
        .description(
            "Changes the role of a member ranked below the caller. \
             The last administrator of a project cannot be demoted.",
        )
        .response::<200, Json<MemberResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Removes a member, or lets the caller leave the project.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        member_id = %path_params.account_id,
    )
)]
async fn remove_member(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    State(sessions): State<SessionRegistry>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<MemberPathParams>,
) -> Result<StatusCode> {
    let MemberPathParams {
        project_id,
        account_id,
    } = path_params;
    let is_self = account_id == auth_state.account_id;

    let actor_role: ProjectRole = if is_self {
        auth_state.authorize_member(&mut conn, project_id).await?
    } else {
        auth_state
            .authorize_project(&mut conn, project_id, &Method::DELETE, Permission::RemoveMember)
            .await?
            .unwrap_or_default()
    };

    let change = conn
        .serializable_transaction(|conn| {
            Box::pin(async move {
                let Some(decision) =
                    judge_member_removal(conn, actor_role, project_id, account_id, is_self)
                        .await?
                else {
                    return Ok::<_, PgError>(MembershipChange::Missing);
                };

                if let Err(denial) = decision.into_result() {
                    return Ok(MembershipChange::Denied(denial));
                }

                conn.remove_project_member(project_id, account_id).await?;
                Ok(MembershipChange::Removed)
            })
        })
        .await?;

    match change {
        MembershipChange::Removed => {}
        MembershipChange::Missing | MembershipChange::Applied(_) => return Err(member_not_found()),
        MembershipChange::Denied(denial) => {
            tracing::warn!(
                target: TRACING_TARGET,
                denial = ?denial,
                is_self,
                "Member removal denied",
            );
            return Err(denial_into_error(denial));
        }
    }

    let evicted = sessions.evict_from_room(account_id, project_id).await;
    tracing::warn!(target: TRACING_TARGET, is_self, evicted, "Member removed");

    if !is_self {
        let project_name = project_name(&mut conn, project_id).await;
        let notification = NewNotification {
            recipient_id: account_id,
            sender_id: Some(auth_state.account_id),
            project_id: Some(project_id),
            notify_type: NotificationType::MemberRemoved,
            priority: NotificationPriority::Medium,
            title: format!("You were removed from {project_name}"),
            message: format!("You no longer have access to {project_name}."),
            metadata: json!({ "projectId": project_id }),
            action_url: None,
        };

        if let Err(error) = dispatcher.notify(&mut conn, notification).await {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Removal notification not created",
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

fn remove_member_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Remove member")
        .description(
            "Removes a member ranked below the caller. Any member may remove \
             themselves, unless they are the last administrator.",
        )
        .response_with::<204, (), _>(|res| res.description("Member removed."))
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Returns routes for project member management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/{projectId}/members",
            get_with(list_members, list_members_docs).post_with(invite_member, invite_member_docs),
        )
        .api_route(
            "/{projectId}/members/{accountId}",
            patch_with(update_member, update_member_docs)
                .delete_with(remove_member, remove_member_docs),
        )
        .with_path_items(|item| item.tag("Members"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::FakeRoles;

    #[test]
    fn last_administrator_is_a_conflict() {
        let error = denial_into_error(RoleChangeDenial::LastAdministrator);
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert!(error.message().unwrap_or_default().contains("only administrator"));
    }

    #[test]
    fn rank_denials_are_forbidden() {
        for denial in [
            RoleChangeDenial::MissingPermission,
            RoleChangeDenial::InsufficientRank,
            RoleChangeDenial::RoleAboveActor,
        ] {
            assert_eq!(denial_into_error(denial).kind(), ErrorKind::Forbidden);
        }
    }

    struct Caller(Uuid);

    impl AuthProvider for Caller {
        fn account_id(&self) -> Uuid {
            self.0
        }
    }

    impl MembershipLedger for FakeRoles {
        async fn administrator_count(&mut self, project_id: Uuid) -> PgResult<i64> {
            let count = self
                .roles
                .iter()
                .filter(|((project, _), role)| *project == project_id && role.is_administrator())
                .count();
            Ok(i64::try_from(count).unwrap_or(i64::MAX))
        }
    }

    /// Runs the authorization and policy steps of `update_member`.
    async fn change_role(
        roles: &mut FakeRoles,
        actor: Uuid,
        project: Uuid,
        target: Uuid,
        requested: ProjectRole,
    ) -> Result<()> {
        let actor_role = Caller(actor).authorize_member(roles, project).await?;
        let decision = judge_role_change(roles, actor_role, project, target, requested)
            .await?
            .ok_or_else(member_not_found)?;
        decision.into_result().map_err(denial_into_error)
    }

    struct Project {
        id: Uuid,
        admin: Uuid,
        moderator: Uuid,
        member: Uuid,
        roles: FakeRoles,
    }

    fn project() -> Project {
        let (id, admin, moderator, member) =
            (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let roles = FakeRoles::default()
            .with(id, admin, ProjectRole::Administrator)
            .with(id, moderator, ProjectRole::Moderator)
            .with(id, member, ProjectRole::Member);

        Project {
            id,
            admin,
            moderator,
            member,
            roles,
        }
    }

    #[tokio::test]
    async fn moderator_demoting_sole_administrator_gets_the_reason() {
        let Project {
            id,
            admin,
            moderator,
            mut roles,
            ..
        } = project();

        let error = change_role(&mut roles, moderator, id, admin, ProjectRole::Member)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert!(error.message().unwrap_or_default().contains("only administrator"));
        assert_eq!(roles.roles.get(&(id, admin)), Some(&ProjectRole::Administrator));
    }

    #[tokio::test]
    async fn moderator_demoting_one_of_two_administrators_is_forbidden() {
        let Project {
            id,
            admin,
            moderator,
            mut roles,
            ..
        } = project();
        roles = roles.with(id, Uuid::now_v7(), ProjectRole::Administrator);

        let error = change_role(&mut roles, moderator, id, admin, ProjectRole::Member)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(
            error.message(),
            Some(RoleChangeDenial::MissingPermission.reason())
        );
    }

    #[tokio::test]
    async fn administrator_may_promote_a_member() {
        let Project {
            id,
            admin,
            member,
            mut roles,
            ..
        } = project();

        change_role(&mut roles, admin, id, member, ProjectRole::Moderator)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn outsiders_and_missing_targets_are_rejected() {
        let Project {
            id,
            admin,
            member,
            mut roles,
            ..
        } = project();

        let error = change_role(&mut roles, Uuid::now_v7(), id, member, ProjectRole::Moderator)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);

        let error = change_role(&mut roles, admin, id, Uuid::now_v7(), ProjectRole::Moderator)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn sole_administrator_cannot_leave() {
        let Project {
            id,
            admin,
            member,
            mut roles,
            ..
        } = project();

        let decision = judge_member_removal(&mut roles, ProjectRole::Administrator, id, admin, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            decision.into_result(),
            Err(RoleChangeDenial::LastAdministrator)
        );

        let decision = judge_member_removal(&mut roles, ProjectRole::Member, id, member, true)
            .await
            .unwrap()
            .unwrap();
        assert!(decision.allowed);
    }
}
