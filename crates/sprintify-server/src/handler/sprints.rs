//! Sprint handlers.
//!
//! A sprint only moves forward through its lifecycle. Starting or completing
//! one notifies every member of the project and the project room.
//!
//! The transition check and the write share one serializable transaction, so
//! two concurrent starts cannot both commit and notify.

use std::future::Future;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use serde_json::json;
use sprintify_core::{NotificationPriority, NotificationType, Permission};
use sprintify_postgres::model::{Sprint as SprintModel, UpdateSprint as SprintChanges};
use sprintify_postgres::query::SprintRepository;
use sprintify_postgres::{PgConnection, PgResult};
use sprintify_postgres::types::SprintState;
use uuid::Uuid;

use crate::extract::{AuthProvider, AuthState, Json, Path, PgPool, ValidateJson};
use crate::handler::request::{CreateSprint, ProjectPathParams, SprintPathParams, UpdateSprint};
use crate::handler::response::{ErrorResponse, Sprint, SprintResponse, SprintsResponse};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{NotificationDispatcher, ProjectNotice, ServiceState};

/// Tracing target for sprint operations.
const TRACING_TARGET: &str = "sprintify_server::handler::sprints";

fn sprint_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Sprint not found")
        .with_resource("sprint")
}

fn transition_refused(previous: SprintState, next: SprintState) -> Error<'static> {
    ErrorKind::Conflict
        .with_message(format!("A {previous} sprint cannot become {next}"))
        .with_resource("sprint")
}

/// Sprint reads and writes needed to apply a lifecycle change.
trait SprintLedger: Send {
    fn current_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<SprintModel>>> + Send;

    fn write_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
        changes: SprintChanges,
    ) -> impl Future<Output = PgResult<Option<SprintModel>>> + Send;
}

impl SprintLedger for PgConnection {
    fn current_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<SprintModel>>> + Send {
        self.find_project_sprint(project_id, sprint_id)
    }

    fn write_sprint(
        &mut self,
        project_id: Uuid,
        sprint_id: Uuid,
        changes: SprintChanges,
    ) -> impl Future<Output = PgResult<Option<SprintModel>>> + Send {
        self.update_sprint(project_id, sprint_id, changes)
    }
}

/// Result of applying changes to one sprint.
#[derive(Debug)]
enum SprintChange {
    Missing,
    Refused {
        previous: SprintState,
        next: SprintState,
    },
    Applied {
        previous: SprintState,
        sprint: SprintModel,
    },
}

/// Checks the requested state against the stored one and writes the changes.
///
/// Nothing is written when the transition is refused.
async fn apply_sprint_changes<L: SprintLedger + ?Sized>(
    ledger: &mut L,
    project_id: Uuid,
    sprint_id: Uuid,
    changes: SprintChanges,
) -> PgResult<SprintChange> {
    let Some(current) = ledger.current_sprint(project_id, sprint_id).await? else {
        return Ok(SprintChange::Missing);
    };

    let previous = current.sprint_state;
    if let Some(next) = changes.sprint_state
        && !previous.can_transition_to(next)
    {
        return Ok(SprintChange::Refused { previous, next });
    }

    match ledger.write_sprint(project_id, sprint_id, changes).await? {
        Some(sprint) => Ok(SprintChange::Applied { previous, sprint }),
        None => Ok(SprintChange::Missing),
    }
}

/// Builds the project-wide notice for a lifecycle edge, if `previous -> next` is one.
fn lifecycle_notice(
    previous: SprintState,
    sprint: &SprintModel,
    sender_id: Uuid,
) -> Option<ProjectNotice> {
    let next = sprint.sprint_state;
    let (notify_type, title) = if previous.is_start(next) {
        (
            NotificationType::SprintStarted,
            format!("{} started", sprint.display_name),
        )
    } else if previous.is_completion(next) {
        (
            NotificationType::SprintCompleted,
            format!("{} completed", sprint.display_name),
        )
    } else {
        return None;
    };

    let message = if sprint.goal.is_empty() {
        title.clone()
    } else {
        format!("Goal: {}", sprint.goal)
    };

    Some(ProjectNotice {
        project_id: sprint.project_id,
        sender_id: Some(sender_id),
        notify_type,
        priority: NotificationPriority::Medium,
        title,
        message,
        metadata: json!({ "sprintId": sprint.id, "state": next }),
        action_url: Some(format!("/projects/{}/sprints/{}", sprint.project_id, sprint.id)),
    })
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn list_sprints(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
) -> Result<(StatusCode, Json<SprintsResponse>)> {
    auth_state
        .authorize_member(&mut conn, path_params.project_id)
        .await?;

    let sprints = conn.list_project_sprints(path_params.project_id).await?;
    Ok((StatusCode::OK, Json(SprintsResponse::new(Sprint::from_models(sprints)))))
}

fn list_sprints_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List sprints")
        .response::<200, Json<SprintsResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
    )
)]
async fn create_sprint(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<ProjectPathParams>,
    ValidateJson(request): ValidateJson<CreateSprint>,
) -> Result<(StatusCode, Json<SprintResponse>)> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::POST,
            Permission::CreateSprint,
        )
        .await?;

    let sprint = conn
        .create_sprint(request.into_model(path_params.project_id))
        .await?;

    tracing::info!(target: TRACING_TARGET, sprint_id = %sprint.id, "Sprint planned");

    Ok((StatusCode::CREATED, Json(SprintResponse::new(Sprint::from_model(sprint)))))
}

fn create_sprint_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create sprint")
        .description("Plans a new sprint. Requires the moderator role.")
        .response::<201, Json<SprintResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        sprint_id = %path_params.sprint_id,
    )
)]
async fn update_sprint(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<SprintPathParams>,
    ValidateJson(request): ValidateJson<UpdateSprint>,
) -> Result<(StatusCode, Json<SprintResponse>)> {
    let SprintPathParams {
        project_id,
        sprint_id,
    } = path_params;

    auth_state
        .authorize_project(&mut conn, project_id, &Method::PATCH, Permission::UpdateSprint)
        .await?;

    let changes = request.into_model();
    let change = conn
        .serializable_transaction(|conn| {
            Box::pin(async move {
                apply_sprint_changes(conn, project_id, sprint_id, changes).await
            })
        })
        .await?;

    let (previous, sprint) = match change {
        SprintChange::Applied { previous, sprint } => (previous, sprint),
        SprintChange::Missing => return Err(sprint_not_found()),
        SprintChange::Refused { previous, next } => return Err(transition_refused(previous, next)),
    };

    tracing::info!(
        target: TRACING_TARGET,
        previous = %previous,
        state = %sprint.sprint_state,
        "Sprint updated",
    );

    if let Some(notice) = lifecycle_notice(previous, &sprint, auth_state.account_id) {
        if let Err(error) = dispatcher.notify_project(&mut conn, notice).await {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Sprint lifecycle notification not created",
            );
        }
    }

    Ok((StatusCode::OK, Json(SprintResponse::new(Sprint::from_model(sprint)))))
}

fn update_sprint_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update sprint")
        .description(
            "Updates a sprint. Setting `state` to ACTIVE or COMPLETED notifies \
             every project member. Requires the moderator role.",
        )
        .response::<200, Json<SprintResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        project_id = %path_params.project_id,
        sprint_id = %path_params.sprint_id,
    )
)]
async fn delete_sprint(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<SprintPathParams>,
) -> Result<StatusCode> {
    auth_state
        .authorize_project(
            &mut conn,
            path_params.project_id,
            &Method::DELETE,
            Permission::DeleteSprint,
        )
        .await?;

    if !conn
        .delete_sprint(path_params.project_id, path_params.sprint_id)
        .await?
    {
        return Err(sprint_not_found());
    }

    tracing::info!(target: TRACING_TARGET, "Sprint deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_sprint_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete sprint")
        .description("Deletes a sprint; its issues return to the backlog. Requires the moderator role.")
        .response_with::<204, (), _>(|res| res.description("Sprint deleted."))
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for sprint management.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/{projectId}/sprints",
            get_with(list_sprints, list_sprints_docs).post_with(create_sprint, create_sprint_docs),
        )
        .api_route(
            "/{projectId}/sprints/{sprintId}",
            patch_with(update_sprint, update_sprint_docs)
                .delete_with(delete_sprint, delete_sprint_docs),
        )
        .with_path_items(|item| item.tag("Sprints"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use jiff_diesel::Timestamp;
    use sprintify_core::ServerEvent;

    use super::*;
    use crate::service::fake::MemoryStore;
    use crate::service::{EmailOutbox, SessionRegistry};

    #[derive(Default)]
    struct FakeSprints {
        rows: HashMap<Uuid, SprintModel>,
        writes: usize,
    }

    impl FakeSprints {
        fn with(mut self, sprint: SprintModel) -> Self {
            self.rows.insert(sprint.id, sprint);
            self
        }
    }

    impl SprintLedger for FakeSprints {
        async fn current_sprint(
            &mut self,
            project_id: Uuid,
            sprint_id: Uuid,
        ) -> PgResult<Option<SprintModel>> {
            Ok(self
                .rows
                .get(&sprint_id)
                .filter(|sprint| sprint.project_id == project_id)
                .cloned())
        }

        async fn write_sprint(
            &mut self,
            project_id: Uuid,
            sprint_id: Uuid,
            changes: SprintChanges,
        ) -> PgResult<Option<SprintModel>> {
            let Some(sprint) = self
                .rows
                .get_mut(&sprint_id)
                .filter(|sprint| sprint.project_id == project_id)
            else {
                return Ok(None);
            };

            self.writes += 1;
            if let Some(display_name) = changes.display_name {
                sprint.display_name = display_name;
            }
            if let Some(goal) = changes.goal {
                sprint.goal = goal;
            }
            if let Some(state) = changes.sprint_state {
                sprint.sprint_state = state;
            }
            Ok(Some(sprint.clone()))
        }
    }

    fn to_state(state: SprintState) -> SprintChanges {
        SprintChanges {
            sprint_state: Some(state),
            ..SprintChanges::default()
        }
    }

    async fn lifecycle_step(
        sprints: &mut FakeSprints,
        sprint: &SprintModel,
        next: SprintState,
    ) -> Result<(SprintState, SprintModel)> {
        let change = apply_sprint_changes(sprints, sprint.project_id, sprint.id, to_state(next)).await?;
        match change {
            SprintChange::Applied { previous, sprint } => Ok((previous, sprint)),
            SprintChange::Missing => Err(sprint_not_found()),
            SprintChange::Refused { previous, next } => Err(transition_refused(previous, next)),
        }
    }

    fn sprint(state: SprintState) -> SprintModel {
        let now = Timestamp::from(jiff::Timestamp::now());
        SprintModel {
            id: Uuid::now_v7(),
            project_id: Uuid::now_v7(),
            display_name: "Sprint 4".into(),
            goal: String::new(),
            sprint_state: state,
            starts_at: None,
            ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn starting_notifies_project() {
        let sprint = sprint(SprintState::Active);
        let notice = lifecycle_notice(SprintState::Planned, &sprint, Uuid::now_v7()).unwrap();

        assert_eq!(notice.notify_type, NotificationType::SprintStarted);
        assert_eq!(notice.title, "Sprint 4 started");
        assert_eq!(notice.project_id, sprint.project_id);
    }

    #[test]
    fn completing_notifies_project() {
        let sprint = sprint(SprintState::Completed);
        let notice = lifecycle_notice(SprintState::Active, &sprint, Uuid::now_v7()).unwrap();
        assert_eq!(notice.notify_type, NotificationType::SprintCompleted);
    }

    #[test]
    fn renaming_is_silent() {
        let sprint = sprint(SprintState::Active);
        assert!(lifecycle_notice(SprintState::Active, &sprint, Uuid::now_v7()).is_none());
    }

    #[tokio::test]
    async fn sprint_moves_forward_and_notifies_the_project() -> anyhow::Result<()> {
        let planned = sprint(SprintState::Planned);
        let mut sprints = FakeSprints::default().with(planned.clone());

        let (outbox, _jobs) = EmailOutbox::channel(8);
        let dispatcher = NotificationDispatcher::new(SessionRegistry::default(), outbox);
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        let mut store = MemoryStore::default();
        store.members.insert(planned.project_id, vec![alice, bob]);

        let watcher = Uuid::now_v7();
        let mut room = dispatcher.sessions().register(bob, watcher).await;
        assert!(dispatcher.sessions().join_room(watcher, planned.project_id).await);

        for (next, expected) in [
            (SprintState::Active, NotificationType::SprintStarted),
            (SprintState::Completed, NotificationType::SprintCompleted),
        ] {
            let (previous, updated) = lifecycle_step(&mut sprints, &planned, next).await?;
            assert_eq!(updated.sprint_state, next);

            let notice = lifecycle_notice(previous, &updated, alice).unwrap();
            let rows = dispatcher.notify_project(&mut store, notice).await?;
            assert_eq!(rows.len(), 2);
            assert!(rows.iter().all(|row| row.notify_type == expected));

            let mut broadcast = None;
            while let Ok(event) = room.try_recv() {
                if let ServerEvent::ProjectNotification {
                    project_id,
                    notification_type,
                    ..
                } = event
                {
                    broadcast = Some((project_id, notification_type));
                }
            }
            assert_eq!(broadcast, Some((planned.project_id, expected)));
        }

        assert_eq!(sprints.writes, 2);
        Ok(())
    }

    #[tokio::test]
    async fn backward_transition_is_a_conflict_and_writes_nothing() {
        let active = sprint(SprintState::Active);
        let mut sprints = FakeSprints::default().with(active.clone());

        let error = lifecycle_step(&mut sprints, &active, SprintState::Planned)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.message(), Some("A ACTIVE sprint cannot become PLANNED"));
        assert_eq!(sprints.writes, 0);
        assert_eq!(sprints.rows[&active.id].sprint_state, SprintState::Active);
    }

    #[tokio::test]
    async fn completed_sprint_cannot_restart() {
        let completed = sprint(SprintState::Completed);
        let mut sprints = FakeSprints::default().with(completed.clone());

        let error = lifecycle_step(&mut sprints, &completed, SprintState::Active)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(sprints.writes, 0);
    }

    #[tokio::test]
    async fn sprint_of_another_project_is_not_found() {
        let planned = sprint(SprintState::Planned);
        let mut sprints = FakeSprints::default().with(planned.clone());

        let change =
            apply_sprint_changes(&mut sprints, Uuid::now_v7(), planned.id, to_state(SprintState::Active))
                .await
                .unwrap();
        assert!(matches!(change, SprintChange::Missing));
        assert_eq!(sprints.writes, 0);
    }
}
