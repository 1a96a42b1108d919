//! Account notification handlers.
//!
//! Every mutation goes through the [`NotificationDispatcher`], which pushes
//! the recomputed unread count to the account's open sockets.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use sprintify_postgres::query::NotificationRepository;

use crate::extract::{AuthState, Json, Path, PgPool, Query};
use crate::handler::request::{NotificationPathParams, NotificationQuery};
use crate::handler::response::{
    ErrorResponse, MarkAllReadResponse, NotificationDeletedResponse, NotificationReadResponse,
    NotificationsResponse, UnreadCountResponse,
};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{NotificationDispatcher, ServiceState, payload};

/// Tracing target for notification operations.
const TRACING_TARGET: &str = "sprintify_server::handler::notifications";

fn notification_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Notification not found")
        .with_resource("notification")
}

/// Lists notifications of the authenticated account, newest first.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id)
)]
async fn list_notifications(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
    Query(query): Query<NotificationQuery>,
) -> Result<(StatusCode, Json<NotificationsResponse>)> {
    let recipient_id = auth_state.account_id;
    let pagination = query.pagination();

    let rows = conn
        .list_recipient_notifications(recipient_id, query.unread_only, pagination)
        .await?;
    let total = conn
        .count_recipient_notifications(recipient_id, query.unread_only)
        .await?;
    let unread_count = conn.count_unread_notifications(recipient_id).await?;

    let page_info = pagination.page_info(rows.len(), total);
    let notifications = rows.iter().map(payload).collect::<Vec<_>>();

    tracing::debug!(
        target: TRACING_TARGET,
        returned = notifications.len(),
        unread_count,
        "Notifications listed"
    );

    Ok((
        StatusCode::OK,
        Json(NotificationsResponse::new(notifications, unread_count, page_info)),
    ))
}

fn list_notifications_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List notifications")
        .description("Returns a page of notifications for the authenticated account.")
        .response::<200, Json<NotificationsResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

/// Returns the unread count of the authenticated account.
#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id)
)]
async fn unread_count(
    PgPool(mut conn): PgPool,
    AuthState(auth_state): AuthState,
) -> Result<(StatusCode, Json<UnreadCountResponse>)> {
    let unread_count = conn
        .count_unread_notifications(auth_state.account_id)
        .await?;

    Ok((StatusCode::OK, Json(UnreadCountResponse::new(unread_count))))
}

fn unread_count_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get unread count")
        .response::<200, Json<UnreadCountResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        notification_id = %path_params.notification_id,
    )
)]
async fn mark_read(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<NotificationPathParams>,
) -> Result<(StatusCode, Json<NotificationReadResponse>)> {
    let Some((notification, unread_count)) = dispatcher
        .mark_read(&mut conn, auth_state.account_id, path_params.notification_id)
        .await?
    else {
        return Err(notification_not_found());
    };

    Ok((
        StatusCode::OK,
        Json(NotificationReadResponse::new(payload(&notification), unread_count)),
    ))
}

fn mark_read_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Mark notification read")
        .description("Marking an already read notification succeeds without changes.")
        .response::<200, Json<NotificationReadResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(account_id = %auth_state.account_id)
)]
async fn mark_all_read(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
) -> Result<(StatusCode, Json<MarkAllReadResponse>)> {
    let (updated, unread_count) = dispatcher
        .mark_all_read(&mut conn, auth_state.account_id)
        .await?;

    Ok((StatusCode::OK, Json(MarkAllReadResponse::new(updated, unread_count))))
}

fn mark_all_read_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Mark all notifications read")
        .response::<200, Json<MarkAllReadResponse>>()
        .response::<401, Json<ErrorResponse>>()
}

#[tracing::instrument(
    skip_all,
    fields(
        account_id = %auth_state.account_id,
        notification_id = %path_params.notification_id,
    )
)]
async fn delete_notification(
    PgPool(mut conn): PgPool,
    State(dispatcher): State<NotificationDispatcher>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<NotificationPathParams>,
) -> Result<(StatusCode, Json<NotificationDeletedResponse>)> {
    let notification_id = path_params.notification_id;
    let Some(unread_count) = dispatcher
        .delete(&mut conn, auth_state.account_id, notification_id)
        .await?
    else {
        return Err(notification_not_found());
    };

    tracing::debug!(target: TRACING_TARGET, "Notification deleted");

    Ok((
        StatusCode::OK,
        Json(NotificationDeletedResponse::new(notification_id, unread_count)),
    ))
}

fn delete_notification_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete notification")
        .response::<200, Json<NotificationDeletedResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns routes for account notifications.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/notifications",
            get_with(list_notifications, list_notifications_docs),
        )
        .api_route(
            "/notifications/unread-count",
            get_with(unread_count, unread_count_docs),
        )
        .api_route(
            "/notifications/mark-all-read",
            patch_with(mark_all_read, mark_all_read_docs),
        )
        .api_route(
            "/notifications/{notificationId}/read",
            patch_with(mark_read, mark_read_docs),
        )
        .api_route(
            "/notifications/{notificationId}",
            delete_with(delete_notification, delete_notification_docs),
        )
        .with_path_items(|item| item.tag("Notifications"))
}
