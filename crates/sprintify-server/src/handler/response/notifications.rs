//! Notification response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sprintify_core::NotificationPayload;
use sprintify_postgres::types::PageInfo;
use uuid::Uuid;

/// A page of the caller's notifications plus the live unread count.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<NotificationPayload>,
    /// Unread notifications across all pages.
    pub unread_count: i64,
    pub pagination: PageInfo,
}

impl NotificationsResponse {
    pub fn new(
        notifications: Vec<NotificationPayload>,
        unread_count: i64,
        pagination: PageInfo,
    ) -> Self {
        Self {
            success: true,
            notifications,
            unread_count,
            pagination,
        }
    }
}

/// Unread notification count.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub success: bool,
    pub unread_count: i64,
}

impl UnreadCountResponse {
    pub fn new(unread_count: i64) -> Self {
        Self {
            success: true,
            unread_count,
        }
    }
}

/// Result of marking a single notification as read.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReadResponse {
    pub success: bool,
    pub notification: NotificationPayload,
    pub unread_count: i64,
}

impl NotificationReadResponse {
    pub fn new(notification: NotificationPayload, unread_count: i64) -> Self {
        Self {
            success: true,
            notification,
            unread_count,
        }
    }
}

/// Result of marking every notification as read.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub success: bool,
    /// Number of notifications that flipped from unread to read.
    pub updated: usize,
    pub unread_count: i64,
}

impl MarkAllReadResponse {
    pub fn new(updated: usize, unread_count: i64) -> Self {
        Self {
            success: true,
            updated,
            unread_count,
        }
    }
}

/// Result of deleting a notification.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDeletedResponse {
    pub success: bool,
    pub notification_id: Uuid,
    pub unread_count: i64,
}

impl NotificationDeletedResponse {
    pub fn new(notification_id: Uuid, unread_count: i64) -> Self {
        Self {
            success: true,
            notification_id,
            unread_count,
        }
    }
}
