//! WebSocket handler for realtime notifications and project rooms.
//!
//! The caller authenticates before the upgrade. Once connected, the socket is
//! registered with the [`SessionRegistry`] and receives every event the
//! dispatcher pushes to the account. Clients may join project rooms (which
//! requires membership) to receive project-wide broadcasts.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use sprintify_core::{ClientEvent, ServerEvent};
use sprintify_postgres::PgClient;
use tokio::sync::mpsc::Receiver;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::extract::{AuthState, Json};
use crate::handler::Result;
use crate::handler::response::ErrorResponse;
use crate::service::{ConnectionId, RoleResolver, ServiceState, SessionRegistry, require_member};

/// Tracing target for websocket operations.
const TRACING_TARGET: &str = "sprintify_server::handler::websocket";

/// Maximum size of an inbound WebSocket message in bytes (64 KiB).
const MAX_MESSAGE_SIZE: usize = 64 * 1_024;

/// Interval between keepalive pings.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Context for a WebSocket connection.
#[derive(Debug, Clone, Copy)]
struct WsContext {
    connection_id: ConnectionId,
    account_id: Uuid,
}

impl WsContext {
    fn new(account_id: Uuid) -> Self {
        Self {
            connection_id: Uuid::now_v7(),
            account_id,
        }
    }
}

/// Counters for a WebSocket connection.
#[derive(Debug, Default)]
struct ConnectionMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    messages_rejected: AtomicU64,
    /// Set when a ping is sent, cleared by the matching pong.
    awaiting_pong: AtomicBool,
}

impl ConnectionMetrics {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_rejected(&self) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
    }
}

fn error_event(message: impl Into<String>) -> ServerEvent {
    ServerEvent::Error {
        message: message.into(),
    }
}

/// Subscribes a connection to a project room if the account is a member.
///
/// Returns the frame to send back to the client.
async fn join_project<R>(
    sessions: &SessionRegistry,
    resolver: &mut R,
    ctx: &WsContext,
    project_id: Uuid,
) -> ServerEvent
where
    R: RoleResolver + ?Sized,
{
    match require_member(resolver, ctx.account_id, project_id).await {
        Ok(Some(role)) => {
            if !sessions.join_room(ctx.connection_id, project_id).await {
                return error_event("Connection is closing");
            }

            tracing::debug!(
                target: TRACING_TARGET,
                connection_id = %ctx.connection_id,
                project_id = %project_id,
                role = %role,
                "joined project room"
            );
            ServerEvent::ProjectJoined { project_id }
        }
        Ok(None) => error_event("You are not a member of this project"),
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                connection_id = %ctx.connection_id,
                project_id = %project_id,
                error = %error,
                "membership lookup failed"
            );
            error_event("Membership could not be verified")
        }
    }
}

/// Applies a parsed client event and returns the reply frame.
async fn handle_client_event(
    ctx: &WsContext,
    event: ClientEvent,
    sessions: &SessionRegistry,
    pg_client: &PgClient,
) -> ServerEvent {
    match event {
        ClientEvent::JoinProject(project_id) => match pg_client.get_connection().await {
            Ok(mut conn) => join_project(sessions, &mut conn, ctx, project_id).await,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    connection_id = %ctx.connection_id,
                    error = %error,
                    "failed to acquire database connection"
                );
                error_event("Membership could not be verified")
            }
        },
        ClientEvent::LeaveProject(project_id) => {
            // Leaving a room the connection never joined is not an error.
            sessions.leave_room(ctx.connection_id, project_id).await;
            ServerEvent::ProjectLeft { project_id }
        }
    }
}

/// Processes an incoming WebSocket message from the client.
async fn process_client_message(
    ctx: &WsContext,
    msg: Message,
    sessions: &SessionRegistry,
    pg_client: &PgClient,
    metrics: &ConnectionMetrics,
) -> ControlFlow<(), ()> {
    let reply = match msg {
        Message::Text(text) => {
            metrics.increment_received();

            match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(ctx, event, sessions, pg_client).await,
                Err(error) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %ctx.connection_id,
                        error = %error,
                        "unrecognized client frame"
                    );
                    metrics.increment_rejected();
                    error_event("Unrecognized event")
                }
            }
        }
        Message::Binary(data) => {
            metrics.increment_received();
            metrics.increment_rejected();

            tracing::debug!(
                target: TRACING_TARGET,
                connection_id = %ctx.connection_id,
                data_length = data.len(),
                "binary frame rejected"
            );
            error_event("Binary frames are not supported")
        }
        Message::Close(close_frame) => {
            tracing::debug!(
                target: TRACING_TARGET,
                connection_id = %ctx.connection_id,
                close_code = close_frame.as_ref().map(|cf| cf.code),
                "client sent close frame"
            );
            return ControlFlow::Break(());
        }
        Message::Pong(_) => {
            metrics.awaiting_pong.store(false, Ordering::Relaxed);
            return ControlFlow::Continue(());
        }
        // Pings are answered by the protocol layer.
        Message::Ping(_) => return ControlFlow::Continue(()),
    };

    sessions.send_to_connection(ctx.connection_id, &reply).await;
    ControlFlow::Continue(())
}

async fn receive_loop(
    ctx: WsContext,
    mut receiver: SplitStream<WebSocket>,
    sessions: SessionRegistry,
    pg_client: PgClient,
    metrics: Arc<ConnectionMetrics>,
) {
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(msg) => {
                let flow =
                    process_client_message(&ctx, msg, &sessions, &pg_client, &metrics).await;
                if flow.is_break() {
                    break;
                }
            }
            Err(e) => {
                // Oversized frames surface here once the protocol layer rejects them.
                tracing::debug!(
                    target: TRACING_TARGET,
                    connection_id = %ctx.connection_id,
                    error = %e,
                    "error receiving from websocket"
                );
                metrics.increment_rejected();
                break;
            }
        }
    }
}

/// Forwards queued server events to the socket and keeps the connection alive.
///
/// Exits when the client goes away, stops answering pings, or the registry
/// closes the queue.
async fn send_loop(
    ctx: WsContext,
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: Receiver<ServerEvent>,
    metrics: Arc<ConnectionMetrics>,
) {
    let mut keepalive = tokio::time::interval(PING_INTERVAL);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
    keepalive.tick().await;

    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else {
                    let frame = CloseFrame {
                        code: close_code::AWAY,
                        reason: Utf8Bytes::from_static("server shutting down"),
                    };
                    let _ = sender.send(Message::Close(Some(frame))).await;
                    break;
                };

                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(
                            target: TRACING_TARGET,
                            connection_id = %ctx.connection_id,
                            event = event.name(),
                            error = %e,
                            "failed to serialize event"
                        );
                        continue;
                    }
                };

                if let Err(e) = sender.send(Message::Text(Utf8Bytes::from(text))).await {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        connection_id = %ctx.connection_id,
                        error = %e,
                        "failed to send message, client disconnected"
                    );
                    break;
                }
                metrics.increment_sent();
            }
            _ = keepalive.tick() => {
                if metrics.awaiting_pong.swap(true, Ordering::Relaxed) {
                    tracing::info!(
                        target: TRACING_TARGET,
                        connection_id = %ctx.connection_id,
                        "keepalive timed out"
                    );
                    break;
                }

                if sender.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Handles the WebSocket connection lifecycle.
///
/// Registers the connection, runs the send and receive loops until either
/// finishes, then unregisters it.
async fn handle_websocket(
    socket: WebSocket,
    account_id: Uuid,
    sessions: SessionRegistry,
    pg_client: PgClient,
) {
    let start_time = Instant::now();
    let ctx = WsContext::new(account_id);
    let metrics = ConnectionMetrics::new();

    let outbound = sessions.register(account_id, ctx.connection_id).await;

    tracing::info!(
        target: TRACING_TARGET,
        connection_id = %ctx.connection_id,
        account_id = %ctx.account_id,
        "websocket connection established"
    );

    let (sender, receiver) = socket.split();

    let mut send_task = tokio::spawn(send_loop(ctx, sender, outbound, metrics.clone()));
    let mut recv_task = tokio::spawn(receive_loop(
        ctx,
        receiver,
        sessions.clone(),
        pg_client,
        metrics.clone(),
    ));

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }

    sessions.unregister(ctx.connection_id).await;

    tracing::info!(
        target: TRACING_TARGET,
        connection_id = %ctx.connection_id,
        account_id = %ctx.account_id,
        duration_ms = start_time.elapsed().as_millis(),
        messages_sent = metrics.messages_sent.load(Ordering::Relaxed),
        messages_received = metrics.messages_received.load(Ordering::Relaxed),
        messages_rejected = metrics.messages_rejected.load(Ordering::Relaxed),
        "websocket connection closed"
    );
}

/// Upgrades an authenticated request to a realtime connection.
#[tracing::instrument(skip_all, fields(account_id = %auth_state.account_id))]
async fn websocket_handler(
    State(sessions): State<SessionRegistry>,
    State(pg_client): State<PgClient>,
    AuthState(auth_state): AuthState,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let account_id = auth_state.account_id;

    tracing::debug!(target: TRACING_TARGET, "websocket upgrade authorized");

    Ok(ws
        .max_message_size(MAX_MESSAGE_SIZE)
        .max_frame_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_websocket(socket, account_id, sessions, pg_client)))
}

fn websocket_handler_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Connect to the realtime socket")
        .description(
            "Upgrades to a WebSocket. The token is read from the `Authorization` \
             header or the `token` query parameter. Frames are JSON objects of \
             the form `{\"event\": ..., \"data\": ...}`.",
        )
        .response::<101, ()>()
        .response_with::<401, Json<ErrorResponse>, _>(|res| {
            res.description("The token is missing, malformed or expired.")
        })
        .response_with::<403, Json<ErrorResponse>, _>(|res| {
            res.description("The token is not an access token.")
        })
}

/// Returns routes for the realtime socket.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/ws", get_with(websocket_handler, websocket_handler_docs))
        .with_path_items(|item| item.tag("WebSocket"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use jiff::SignedDuration;
    use sprintify_core::{ProjectRole, TokenType};

    use super::*;
    use crate::extract::AuthClaims;
    use crate::service::SessionKeys;
    use crate::service::fake::FakeRoles;

    fn test_server() -> anyhow::Result<(TestServer, SessionKeys)> {
        let state = ServiceState::for_tests();
        let keys = state.session_keys.clone();
        let app = crate::handler::routes(state.clone()).with_state(state);
        Ok((TestServer::new(axum::Router::from(app))?, keys))
    }

    fn token(keys: &SessionKeys, token_type: TokenType) -> anyhow::Result<String> {
        let claims = AuthClaims::new(
            Uuid::now_v7(),
            "ada@example.com",
            true,
            token_type,
            SignedDuration::from_hours(1),
        );
        Ok(claims.encode(keys.encoding_key())?)
    }

    #[tokio::test]
    async fn non_access_tokens_are_refused_before_upgrade() -> anyhow::Result<()> {
        let (server, keys) = test_server()?;

        for token_type in [TokenType::EmailVerification, TokenType::ResetPassword] {
            let token = token(&keys, token_type)?;

            let response = server.get("/api/v1/ws").add_query_param("token", &token).await;
            response.assert_status(StatusCode::FORBIDDEN);
            let body: serde_json::Value = response.json();
            assert_eq!(body["message"], "invalid token type");

            server
                .get("/api/v1/ws")
                .authorization_bearer(&token)
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
        Ok(())
    }

    #[tokio::test]
    async fn access_token_passes_the_type_check() -> anyhow::Result<()> {
        let (server, keys) = test_server()?;
        let token = token(&keys, TokenType::Access)?;

        // The account lookup runs next and the test database is unreachable.
        server
            .get("/api/v1/ws")
            .add_query_param("token", &token)
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
        Ok(())
    }

    async fn connected(sessions: &SessionRegistry) -> (WsContext, Receiver<ServerEvent>) {
        let ctx = WsContext::new(Uuid::now_v7());
        let outbound = sessions.register(ctx.account_id, ctx.connection_id).await;
        (ctx, outbound)
    }

    #[tokio::test]
    async fn member_joins_room() {
        let sessions = SessionRegistry::default();
        let (ctx, _outbound) = connected(&sessions).await;
        let project_id = Uuid::now_v7();
        let mut roles = FakeRoles::default().with(project_id, ctx.account_id, ProjectRole::Member);

        let reply = join_project(&sessions, &mut roles, &ctx, project_id).await;

        assert_eq!(reply, ServerEvent::ProjectJoined { project_id });
        assert!(sessions.rooms_for(ctx.connection_id).await.contains(&project_id));
    }

    #[tokio::test]
    async fn outsider_is_refused() {
        let sessions = SessionRegistry::default();
        let (ctx, _outbound) = connected(&sessions).await;
        let project_id = Uuid::now_v7();
        let mut roles = FakeRoles::default();

        let reply = join_project(&sessions, &mut roles, &ctx, project_id).await;

        assert!(matches!(reply, ServerEvent::Error { .. }));
        assert!(sessions.rooms_for(ctx.connection_id).await.is_empty());
    }

    #[tokio::test]
    async fn closed_connection_cannot_join() {
        let sessions = SessionRegistry::default();
        let (ctx, _outbound) = connected(&sessions).await;
        let project_id = Uuid::now_v7();
        let mut roles =
            FakeRoles::default().with(project_id, ctx.account_id, ProjectRole::Administrator);

        sessions.unregister(ctx.connection_id).await;
        let reply = join_project(&sessions, &mut roles, &ctx, project_id).await;

        assert!(matches!(reply, ServerEvent::Error { .. }));
        assert_eq!(sessions.connection_count().await, 0);
    }
}
