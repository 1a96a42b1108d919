//! Socket frame codec.

use sprintify_core::{ClientEvent, ServerEvent};

use crate::Result;

/// Decodes a text frame pushed by the server.
pub fn decode_frame(text: &str) -> Result<ServerEvent> {
    Ok(serde_json::from_str(text)?)
}

/// Encodes a client frame.
pub fn encode_frame(event: &ClientEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn decodes_unread_count_events() {
        let id = Uuid::from_u128(3);
        let text = json!({
            "event": "notification:read",
            "data": { "notificationId": id, "unreadCount": 2 }
        })
        .to_string();

        let event = decode_frame(&text).unwrap();
        assert_eq!(
            event,
            ServerEvent::NotificationRead {
                notification_id: id,
                unread_count: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_events() {
        let text = json!({ "event": "issue:moved", "data": {} }).to_string();
        assert!(decode_frame(&text).is_err());
    }

    #[test]
    fn encodes_join_frames() {
        let id = Uuid::from_u128(5);
        let text = encode_frame(&ClientEvent::JoinProject(id)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({ "event": "join-project", "data": id }));
    }
}
