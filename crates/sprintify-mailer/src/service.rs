//! Email provider trait and service handle.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::{EmailMessage, EmailReceipt, Result, TRACING_TARGET};

/// Core trait for email delivery backends.
#[async_trait::async_trait]
pub trait EmailProvider: Send + Sync {
    /// Short provider name used in logs and receipts.
    fn name(&self) -> &'static str;

    /// Hands a message to the backend.
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt>;
}

/// Cloneable email service handle with structured logging.
#[derive(Clone)]
pub struct EmailService {
    inner: Arc<dyn EmailProvider>,
}

impl fmt::Debug for EmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailService")
            .field("provider", &self.inner.name())
            .finish()
    }
}

impl EmailService {
    /// Wraps a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: EmailProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Returns the name of the wrapped provider.
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    /// Validates and sends a message.
    pub async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt> {
        message.validate()?;

        let started_at = Instant::now();
        let result = self.inner.send(message).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(receipt) => tracing::debug!(
                target: TRACING_TARGET,
                message_id = %receipt.message_id,
                provider = %receipt.provider,
                elapsed_ms = elapsed.as_millis(),
                "Email accepted"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                message_id = %message.message_id,
                provider = self.inner.name(),
                error = %error,
                retryable = error.is_retryable(),
                elapsed_ms = elapsed.as_millis(),
                "Email delivery failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{Error, ErrorKind};

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait::async_trait]
    impl EmailProvider for Arc<Recorder> {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(message.clone());
            }
            Ok(EmailReceipt::now(message.message_id, self.name()))
        }
    }

    struct Refusing;

    #[async_trait::async_trait]
    impl EmailProvider for Refusing {
        fn name(&self) -> &'static str {
            "refusing"
        }

        async fn send(&self, _: &EmailMessage) -> Result<EmailReceipt> {
            Err(Error::new(ErrorKind::Rejected))
        }
    }

    #[tokio::test]
    async fn forwards_valid_messages() {
        let recorder = Arc::new(Recorder::default());
        let service = EmailService::new(recorder.clone());

        let message = EmailMessage::new("ada@example.com", "Hello", "Body");
        let receipt = service.send(&message).await.ok();
        assert_eq!(receipt.map(|r| r.message_id), Some(message.message_id));
        assert_eq!(recorder.sent.lock().map(|s| s.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn invalid_messages_never_reach_the_provider() {
        let recorder = Arc::new(Recorder::default());
        let service = EmailService::new(recorder.clone());

        let result = service.send(&EmailMessage::new("nobody", "Hello", "Body")).await;
        assert_eq!(result.err().map(|e| e.kind), Some(ErrorKind::InvalidInput));
        assert_eq!(recorder.sent.lock().map(|s| s.len()).ok(), Some(0));
    }

    #[tokio::test]
    async fn provider_errors_are_returned() {
        let service = EmailService::new(Refusing);
        let result = service
            .send(&EmailMessage::new("ada@example.com", "Hello", "Body"))
            .await;
        assert_eq!(result.err().map(|e| e.kind), Some(ErrorKind::Rejected));
    }
}
