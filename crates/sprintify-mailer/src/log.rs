//! Provider that writes emails to the log instead of sending them.

use crate::{EmailMessage, EmailProvider, EmailReceipt, Result, TRACING_TARGET};

/// Email provider that records each message as a `tracing` event.
///
/// Used in development and whenever no relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait::async_trait]
impl EmailProvider for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt> {
        tracing::info!(
            target: TRACING_TARGET,
            message_id = %message.message_id,
            to = %message.to,
            subject = %message.subject,
            notification_id = ?message.notification_id,
            "Email logged instead of sent"
        );

        Ok(EmailReceipt::now(message.message_id, self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_accepts() {
        let message = EmailMessage::new("ada@example.com", "Hello", "Body");
        let receipt = LogMailer.send(&message).await.ok();
        assert_eq!(receipt.as_ref().map(|r| r.provider.as_str()), Some("log"));
    }
}
