//! Email message and delivery receipt.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, ErrorKind, Result};

/// Longest subject line accepted by providers.
const MAX_SUBJECT_LEN: usize = 256;

/// A plain-text email addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    /// Unique message identifier, used by relays for deduplication.
    pub message_id: Uuid,
    /// Recipient email address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Notification this email escalates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<Uuid>,
}

impl EmailMessage {
    /// Creates a new message with a fresh identifier.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::now_v7(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            notification_id: None,
        }
    }

    /// Links the message to the notification it escalates.
    #[must_use]
    pub fn with_notification(mut self, notification_id: Uuid) -> Self {
        self.notification_id = Some(notification_id);
        self
    }

    /// Checks the fields every provider relies on.
    pub fn validate(&self) -> Result<()> {
        let to = self.to.trim();
        let valid_address = to
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

        if !valid_address {
            return Err(Error::new(ErrorKind::InvalidInput)
                .with_message(format!("invalid recipient address: {to}")));
        }

        if self.subject.trim().is_empty() || self.subject.len() > MAX_SUBJECT_LEN {
            return Err(Error::new(ErrorKind::InvalidInput)
                .with_message("subject must be between 1 and 256 bytes"));
        }

        Ok(())
    }
}

/// Confirmation that a provider accepted a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReceipt {
    /// Identifier of the accepted message.
    pub message_id: Uuid,
    /// Provider that accepted it.
    pub provider: String,
    /// When the provider accepted it.
    pub accepted_at: Timestamp,
}

impl EmailReceipt {
    /// Creates a receipt stamped with the current time.
    pub fn now(message_id: Uuid, provider: impl Into<String>) -> Self {
        Self {
            message_id,
            provider: provider.into(),
            accepted_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_message() {
        let message = EmailMessage::new("ada@example.com", "Invitation", "You were invited");
        assert!(message.validate().is_ok());
        assert!(message.notification_id.is_none());
    }

    #[test]
    fn rejects_bad_recipient() {
        for to in ["", "noatsign", "@example.com", "ada@localhost"] {
            let message = EmailMessage::new(to, "Subject", "Body");
            let error = message.validate().err().map(|e| e.kind);
            assert_eq!(error, Some(ErrorKind::InvalidInput), "{to}");
        }
    }

    #[test]
    fn rejects_empty_subject() {
        let message = EmailMessage::new("ada@example.com", "   ", "Body");
        assert!(message.validate().is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let id = Uuid::nil();
        let message = EmailMessage::new("ada@example.com", "S", "B").with_notification(id);
        let json = serde_json::to_value(&message).ok();
        let notification_id = json
            .as_ref()
            .and_then(|v| v.get("notificationId"))
            .and_then(|v| v.as_str());
        assert_eq!(notification_id, Some("00000000-0000-0000-0000-000000000000"));
    }
}
