//! Notification model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::notifications;
use crate::types::{NotificationPriority, NotificationType};

/// A persisted notification addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// Account the notification is addressed to.
    pub recipient_id: Uuid,
    /// Account whose action caused the notification.
    pub sender_id: Option<Uuid>,
    /// Project the notification relates to.
    pub project_id: Option<Uuid>,
    /// Kind of event.
    pub notify_type: NotificationType,
    /// Delivery priority.
    pub priority: NotificationPriority,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// When it was read; set exactly when `is_read` is.
    pub read_at: Option<Timestamp>,
    /// Structured context for the client.
    pub metadata: serde_json::Value,
    /// Link the client may open.
    pub action_url: Option<String>,
    /// Whether an escalation email was delivered.
    pub email_sent: bool,
    /// Timestamp when the notification was created.
    pub created_at: Timestamp,
}

/// Data for creating a new notification.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub notify_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub action_url: Option<String>,
}
