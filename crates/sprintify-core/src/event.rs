//! Realtime socket frames.
//!
//! Every frame is a JSON object `{ "event": "<name>", "data": <payload> }`.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{NotificationPriority, NotificationType};

/// Notification as carried by socket frames and REST responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub recipient_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Uuid>,
    pub is_read: bool,
    pub metadata: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    pub email_sent: bool,
    pub created_at: Timestamp,
}

/// Frame pushed from the server to a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// A notification was created for the connected user.
    #[serde(rename = "notification:new")]
    NotificationNew {
        notification: NotificationPayload,
        unread_count: i64,
    },

    /// A notification was marked as read.
    #[serde(rename = "notification:read")]
    NotificationRead {
        notification_id: Uuid,
        unread_count: i64,
    },

    /// A notification was deleted.
    #[serde(rename = "notification:deleted")]
    NotificationDeleted {
        notification_id: Uuid,
        unread_count: i64,
    },

    /// Every notification of the connected user was marked as read.
    #[serde(rename = "notifications:all-read")]
    NotificationsAllRead { unread_count: i64 },

    /// Broadcast to everyone currently in a project room.
    #[serde(rename = "project:notification")]
    ProjectNotification {
        project_id: Uuid,
        title: String,
        message: String,
        #[serde(rename = "type")]
        notification_type: NotificationType,
        metadata: serde_json::Value,
    },

    /// The connection joined a project room.
    #[serde(rename = "project:joined")]
    ProjectJoined { project_id: Uuid },

    /// The connection left a project room.
    #[serde(rename = "project:left")]
    ProjectLeft { project_id: Uuid },

    /// A client frame was rejected.
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerEvent {
    /// Returns the wire name of this event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotificationNew { .. } => "notification:new",
            Self::NotificationRead { .. } => "notification:read",
            Self::NotificationDeleted { .. } => "notification:deleted",
            Self::NotificationsAllRead { .. } => "notifications:all-read",
            Self::ProjectNotification { .. } => "project:notification",
            Self::ProjectJoined { .. } => "project:joined",
            Self::ProjectLeft { .. } => "project:left",
            Self::Error { .. } => "error",
        }
    }

    /// Returns the unread count carried by this event, if any.
    pub const fn unread_count(&self) -> Option<i64> {
        match self {
            Self::NotificationNew { unread_count, .. }
            | Self::NotificationRead { unread_count, .. }
            | Self::NotificationDeleted { unread_count, .. }
            | Self::NotificationsAllRead { unread_count } => Some(*unread_count),
            _ => None,
        }
    }
}

/// Frame sent from a client to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Subscribe this connection to a project room.
    #[serde(rename = "join-project")]
    JoinProject(Uuid),

    /// Unsubscribe this connection from a project room.
    #[serde(rename = "leave-project")]
    LeaveProject(Uuid),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn server_event_wire_shape() {
        let id = Uuid::nil();
        let event = ServerEvent::NotificationRead {
            notification_id: id,
            unread_count: 3,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "notification:read",
                "data": { "notificationId": id, "unreadCount": 3 }
            })
        );
        assert_eq!(value["event"], event.name());
        assert_eq!(event.unread_count(), Some(3));
    }

    #[test]
    fn all_read_wire_shape() {
        let value = serde_json::to_value(ServerEvent::NotificationsAllRead { unread_count: 0 })
            .unwrap();
        assert_eq!(
            value,
            json!({ "event": "notifications:all-read", "data": { "unreadCount": 0 } })
        );
    }

    #[test]
    fn project_notification_uses_type_key() {
        let event = ServerEvent::ProjectNotification {
            project_id: Uuid::nil(),
            title: "Sprint 4 started".into(),
            message: "Good luck".into(),
            notification_type: NotificationType::SprintStarted,
            metadata: json!({}),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["data"]["type"], "SPRINT_STARTED");
        assert_eq!(value["data"]["projectId"], Uuid::nil().to_string());
        assert_eq!(event.unread_count(), None);
    }

    #[test]
    fn client_event_parses() {
        let id = Uuid::from_u128(7);
        let frame = json!({ "event": "join-project", "data": id }).to_string();
        let event: ClientEvent = serde_json::from_str(&frame).unwrap();
        assert_eq!(event, ClientEvent::JoinProject(id));

        let frame = json!({ "event": "leave-project", "data": id }).to_string();
        let event: ClientEvent = serde_json::from_str(&frame).unwrap();
        assert_eq!(event, ClientEvent::LeaveProject(id));

        let frame = json!({ "event": "drop-tables", "data": id }).to_string();
        assert!(serde_json::from_str::<ClientEvent>(&frame).is_err());
    }
}
