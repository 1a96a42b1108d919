//! Relay client that posts emails as JSON.

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use super::{Error, TRACING_TARGET};
use crate::{EmailMessage, EmailProvider, EmailReceipt, EmailService, MailerConfig};

/// Request body accepted by the relay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    message_id: Uuid,
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_id: Option<Uuid>,
}

struct RelayMailerInner {
    http: Client,
    endpoint: Url,
    config: MailerConfig,
}

/// Email provider that hands messages to an HTTP relay.
#[derive(Clone)]
pub struct RelayMailer {
    inner: Arc<RelayMailerInner>,
}

impl fmt::Debug for RelayMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayMailer")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("timeout", &self.inner.config.timeout())
            .finish_non_exhaustive()
    }
}

impl RelayMailer {
    /// Creates a relay client posting to `endpoint`.
    pub fn new(endpoint: Url, config: MailerConfig) -> crate::Result<Self> {
        let timeout = config.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("sprintify/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::from)?;

        tracing::info!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            timeout_ms = timeout.as_millis(),
            "Mail relay client created"
        );

        Ok(Self {
            inner: Arc::new(RelayMailerInner {
                http,
                endpoint,
                config,
            }),
        })
    }

    /// Converts this client into an [`EmailService`].
    pub fn into_service(self) -> EmailService {
        EmailService::new(self)
    }
}

#[async_trait::async_trait]
impl EmailProvider for RelayMailer {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn send(&self, message: &EmailMessage) -> crate::Result<EmailReceipt> {
        let body = RelayRequest {
            message_id: message.message_id,
            from: &self.inner.config.mailer_from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
            notification_id: message.notification_id,
        };

        let mut request = self.inner.http.post(self.inner.endpoint.clone()).json(&body);
        if let Some(token) = &self.inner.config.mailer_relay_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(Error::from)?;
        let status = response.status();

        tracing::debug!(
            target: TRACING_TARGET,
            message_id = %message.message_id,
            status = status.as_u16(),
            "Relay responded"
        );

        if !status.is_success() {
            return Err(Error::Status(status.as_u16()).into());
        }

        Ok(EmailReceipt::now(message.message_id, self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_config() {
        let endpoint: Option<Url> = "https://relay.example.com/send".parse().ok();
        let client = endpoint.and_then(|url| RelayMailer::new(url, MailerConfig::default()).ok());
        assert_eq!(client.map(|c| c.name()), Some("relay"));
    }

    #[test]
    fn relay_body_shape() {
        let message = EmailMessage::new("ada@example.com", "Hi", "Body");
        let body = RelayRequest {
            message_id: message.message_id,
            from: "noreply@example.com",
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
            notification_id: None,
        };
        let json = serde_json::to_value(&body).ok();
        assert!(json.as_ref().is_some_and(|v| v.get("messageId").is_some()));
        assert!(json.as_ref().is_some_and(|v| v.get("notificationId").is_none()));
    }
}
