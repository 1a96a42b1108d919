//! Realtime socket transport with reconnect.

use futures::{SinkExt, StreamExt};
use reqwest::StatusCode;
use sprintify_core::{ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use uuid::Uuid;

use super::{ConnectionState, ReconnectPolicy, decode_frame, encode_frame};
use crate::{ApiClient, Error, Result};

/// Tracing target for the socket transport.
pub const TRACING_TARGET: &str = "sprintify_client::realtime";

/// Item produced by [`RealtimeClient::spawn`].
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeUpdate {
    /// The connection changed state.
    State(ConnectionState),
    /// The server pushed a frame.
    Event(ServerEvent),
}

/// Keeps a socket open to the realtime endpoint and rejoins project rooms
/// after every reconnect.
#[derive(Debug)]
pub struct RealtimeClient {
    api: ApiClient,
    policy: ReconnectPolicy,
    projects: Vec<Uuid>,
}

impl RealtimeClient {
    /// Creates a transport for an authenticated API client.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            policy: ReconnectPolicy::default(),
            projects: Vec::new(),
        }
    }

    /// Replaces the reconnect policy.
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Joins a project room on every (re)connect.
    pub fn with_project(mut self, project_id: Uuid) -> Self {
        if !self.projects.contains(&project_id) {
            self.projects.push(project_id);
        }
        self
    }

    /// Runs the transport on a background task.
    ///
    /// The task ends when the receiver is dropped, when the server rejects the
    /// credential, or when reconnect attempts are exhausted.
    pub fn spawn(self, buffer: usize) -> (mpsc::Receiver<RealtimeUpdate>, JoinHandle<Result<()>>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    async fn run(mut self, tx: mpsc::Sender<RealtimeUpdate>) -> Result<()> {
        loop {
            match self.session(&tx).await {
                Ok(false) => return Ok(()),
                Ok(true) => {
                    tracing::debug!(target: TRACING_TARGET, "socket closed by server");
                }
                Err(error) if error.is_unauthorized() || error.is_forbidden() => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        "socket credential rejected, realtime disabled"
                    );
                    let _ = tx.send(RealtimeUpdate::State(ConnectionState::Failed)).await;
                    return Err(error);
                }
                Err(error) => {
                    tracing::debug!(target: TRACING_TARGET, error = %error, "socket failed");
                }
            }

            let state = self.policy.on_failure(Instant::now());
            if tx.send(RealtimeUpdate::State(state)).await.is_err() {
                return Ok(());
            }

            match state {
                ConnectionState::Reconnecting { attempt, delay } => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        attempt = attempt,
                        delay_ms = delay.as_millis(),
                        "reconnecting"
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => {
                    return Err(Error::ReconnectExhausted {
                        attempts: self.policy.attempts(),
                    });
                }
            }
        }
    }

    /// Runs one connection. Returns `false` once nobody listens anymore.
    async fn session(&mut self, tx: &mpsc::Sender<RealtimeUpdate>) -> Result<bool> {
        let url = self.api.socket_url()?;
        let (mut stream, _) = connect_async(url.as_str()).await.map_err(handshake_error)?;

        let state = self.policy.on_connected(Instant::now());
        if tx.send(RealtimeUpdate::State(state)).await.is_err() {
            return Ok(false);
        }

        for project_id in &self.projects {
            let frame = encode_frame(&ClientEvent::JoinProject(*project_id))?;
            stream
                .send(Message::text(frame))
                .await
                .map_err(Box::new)?;
        }

        while let Some(message) = stream.next().await {
            match message.map_err(Box::new)? {
                Message::Text(text) => match decode_frame(text.as_str()) {
                    Ok(event) => {
                        if tx.send(RealtimeUpdate::Event(event)).await.is_err() {
                            let _ = stream.close(None).await;
                            return Ok(false);
                        }
                    }
                    Err(error) => {
                        tracing::debug!(
                            target: TRACING_TARGET,
                            error = %error,
                            "ignoring undecodable frame"
                        );
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }

        Ok(true)
    }
}

/// Surfaces an HTTP rejection of the upgrade as an API error.
fn handshake_error(error: tungstenite::Error) -> Error {
    match error {
        tungstenite::Error::Http(response) => {
            let status = StatusCode::from_u16(response.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            Error::Api {
                status,
                name: "handshake_rejected".to_owned(),
                message: status
                    .canonical_reason()
                    .unwrap_or("upgrade rejected")
                    .to_owned(),
                errors: Vec::new(),
            }
        }
        other => Error::Socket(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::routing::get;
    use tokio::net::TcpListener;
    use url::Url;

    use super::*;
    use crate::ClientConfig;

    /// Serves `/api/v1/ws` with a fixed status and counts handshakes.
    async fn refusing_server(status: StatusCode) -> anyhow::Result<(ApiClient, Arc<AtomicUsize>)> {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/api/v1/ws",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { status }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let config = ClientConfig::new(Url::parse(&format!("http://{addr}"))?);
        Ok((ApiClient::new(config)?.with_token("expired"), hits))
    }

    #[tokio::test]
    async fn rejected_credential_fails_without_retrying() -> anyhow::Result<()> {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let (api, hits) = refusing_server(status).await?;
            let policy =
                ReconnectPolicy::new(5, Duration::from_millis(1), Duration::from_millis(2));

            let (mut rx, handle) = RealtimeClient::new(api).with_policy(policy).spawn(8);

            let mut states = Vec::new();
            while let Some(RealtimeUpdate::State(state)) = rx.recv().await {
                states.push(state);
            }

            assert_eq!(states, vec![ConnectionState::Failed]);
            let error = handle.await?.unwrap_err();
            assert_eq!(error.status(), Some(status));
            assert_eq!(hits.load(Ordering::SeqCst), 1);
        }
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_exhausts_the_policy() -> anyhow::Result<()> {
        // Port 1 refuses connections.
        let config = ClientConfig::new(Url::parse("http://127.0.0.1:1")?);
        let api = ApiClient::new(config)?.with_token("t");
        let policy = ReconnectPolicy::new(2, Duration::from_millis(1), Duration::from_millis(2));

        let (mut rx, handle) = RealtimeClient::new(api).with_policy(policy).spawn(8);

        let mut states = Vec::new();
        while let Some(RealtimeUpdate::State(state)) = rx.recv().await {
            states.push(state);
        }

        assert_eq!(states.last(), Some(&ConnectionState::Failed));
        assert_eq!(states.len(), 3);
        assert!(matches!(
            handle.await?,
            Err(Error::ReconnectExhausted { attempts: 2 })
        ));
        Ok(())
    }
}
