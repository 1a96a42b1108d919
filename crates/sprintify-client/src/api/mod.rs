//! REST client for the Sprintify API.

mod types;

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use sprintify_core::{CONTRACT_HEADER, CONTRACT_VERSION};
use url::Url;
use uuid::Uuid;

#[cfg(test)]
pub(crate) use self::types::tests::issue as test_issue;
pub use self::types::{
    AllRead, Issue, IssueFilter, IssuePatch, IssuesPage, NotificationDeleted, NotificationFilter,
    NotificationRead, NotificationsPage, PageInfo,
};
use self::types::{ErrorBody, IssueEnvelope, UnreadCount};
use crate::{ClientConfig, Error, Result};

/// Tracing target for REST calls.
pub const TRACING_TARGET: &str = "sprintify_client::api";

/// Path prefix of the authenticated API.
const API_PREFIX: &str = "api/v1/";

struct ApiClientInner {
    http: Client,
    config: ClientConfig,
}

/// REST client that attaches the access token and the contract version to
/// every request.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    token: Option<Arc<str>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    pub fn new(mut config: ClientConfig) -> Result<Self> {
        if !config.base_url.path().ends_with('/') {
            let path = format!("{}/", config.base_url.path());
            config.base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()?;

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            "api client created"
        );

        Ok(Self {
            inner: Arc::new(ApiClientInner { http, config }),
            token: None,
        })
    }

    /// Returns a client that authenticates with `token`.
    pub fn with_token(&self, token: impl Into<Arc<str>>) -> Self {
        Self {
            inner: self.inner.clone(),
            token: Some(token.into()),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the realtime endpoint URL, carrying the token as a query
    /// parameter since socket handshakes cannot set headers everywhere.
    pub fn socket_url(&self) -> Result<Url> {
        let mut url = self.url("ws")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // Both schemes are special, so the swap cannot fail.
        let _ = url.set_scheme(scheme);
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self
            .inner
            .config
            .base_url
            .join(API_PREFIX)?
            .join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(CONTRACT_HEADER, CONTRACT_VERSION.to_string());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    /// Turns an error status into [`Error::Api`] using the error envelope.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let message = if body.message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_owned()
        } else {
            body.message
        };

        tracing::debug!(
            target: TRACING_TARGET,
            status = status.as_u16(),
            name = %body.name,
            "api request failed"
        );

        Err(Error::Api {
            status,
            name: body.name,
            message,
            errors: body.errors,
        })
    }

    /// Lists the caller's notifications with the unread count.
    pub async fn list_notifications(&self, filter: &NotificationFilter) -> Result<NotificationsPage> {
        let builder = self.request(Method::GET, "notifications")?.query(filter);
        self.send(builder).await
    }

    /// Returns the caller's unread notification count.
    pub async fn unread_count(&self) -> Result<i64> {
        let builder = self.request(Method::GET, "notifications/unread-count")?;
        let count: UnreadCount = self.send(builder).await?;
        Ok(count.unread_count)
    }

    /// Marks one notification as read.
    pub async fn mark_read(&self, notification_id: Uuid) -> Result<NotificationRead> {
        let path = format!("notifications/{notification_id}/read");
        let builder = self.request(Method::PATCH, &path)?;
        self.send(builder).await
    }

    /// Marks every notification as read.
    pub async fn mark_all_read(&self) -> Result<AllRead> {
        let builder = self.request(Method::PATCH, "notifications/mark-all-read")?;
        self.send(builder).await
    }

    /// Deletes one notification.
    pub async fn delete_notification(&self, notification_id: Uuid) -> Result<NotificationDeleted> {
        let path = format!("notifications/{notification_id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.send(builder).await
    }

    /// Lists a project's issues.
    pub async fn list_issues(&self, project_id: Uuid, filter: &IssueFilter) -> Result<IssuesPage> {
        let path = format!("{project_id}/issues");
        let builder = self.request(Method::GET, &path)?.query(filter);
        self.send(builder).await
    }

    /// Updates or moves an issue and returns the stored row.
    pub async fn update_issue(
        &self,
        project_id: Uuid,
        issue_id: Uuid,
        patch: &IssuePatch,
    ) -> Result<Issue> {
        let path = format!("{project_id}/issues/{issue_id}");
        let builder = self.request(Method::PATCH, &path)?.json(patch);
        let envelope: IssueEnvelope = self.send(builder).await?;
        Ok(envelope.issue)
    }

    /// Deletes an issue.
    pub async fn delete_issue(&self, project_id: Uuid, issue_id: Uuid) -> Result<()> {
        let path = format!("{project_id}/issues/{issue_id}");
        let builder = self.request(Method::DELETE, &path)?;
        self.send_empty(builder).await
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, patch};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    async fn spawn(router: Router) -> anyhow::Result<ApiClient> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let config = ClientConfig::new(Url::parse(&format!("http://{addr}"))?);
        Ok(ApiClient::new(config)?.with_token("token-123"))
    }

    #[test]
    fn socket_url_swaps_scheme_and_carries_token() -> anyhow::Result<()> {
        let config = ClientConfig::new(Url::parse("https://api.sprintify.dev")?);
        let client = ApiClient::new(config)?.with_token("abc");

        let url = client.socket_url()?;
        assert_eq!(url.as_str(), "wss://api.sprintify.dev/api/v1/ws?token=abc");
        Ok(())
    }

    #[tokio::test]
    async fn sends_token_and_contract_version() -> anyhow::Result<()> {
        async fn unread(headers: HeaderMap) -> Json<Value> {
            let contract = headers
                .get(CONTRACT_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            let bearer = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();

            let count = if contract == CONTRACT_VERSION.to_string() && bearer == "Bearer token-123" {
                7
            } else {
                -1
            };
            Json(json!({ "success": true, "unreadCount": count }))
        }

        let client = spawn(Router::new().route("/api/v1/notifications/unread-count", get(unread))).await?;
        assert_eq!(client.unread_count().await?, 7);
        Ok(())
    }

    #[tokio::test]
    async fn decodes_error_envelope() -> anyhow::Result<()> {
        async fn forbidden() -> (StatusCode, Json<Value>) {
            (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "success": false,
                    "name": "forbidden",
                    "message": "Insufficient permissions",
                })),
            )
        }

        let router = Router::new().route("/api/v1/{project}/issues/{issue}", patch(forbidden));
        let client = spawn(router).await?;

        let error = client
            .update_issue(Uuid::nil(), Uuid::nil(), &IssuePatch::move_to(None, 0))
            .await
            .expect_err("forbidden");
        assert!(error.is_forbidden());
        match error {
            Error::Api { name, message, .. } => {
                assert_eq!(name, "forbidden");
                assert_eq!(message, "Insufficient permissions");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn missing_envelope_falls_back_to_reason() -> anyhow::Result<()> {
        let router = Router::new().route(
            "/api/v1/notifications/mark-all-read",
            patch(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = spawn(router).await?;

        let error = client.mark_all_read().await.expect_err("unavailable");
        assert!(error.is_transient());
        assert!(error.to_string().contains("Service Unavailable"));
        Ok(())
    }
}
