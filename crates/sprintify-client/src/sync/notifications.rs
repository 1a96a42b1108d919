//! Notification list and unread counter.

use sprintify_core::{NotificationPayload, ServerEvent};
use tokio::time::Instant;
use uuid::Uuid;

use super::PollSchedule;
use crate::Result;
use crate::api::{
    AllRead, ApiClient, NotificationDeleted, NotificationFilter, NotificationRead,
    NotificationsPage,
};

/// Tracing target for notification reconciliation.
const TRACING_TARGET: &str = "sprintify_client::sync::notifications";

/// Client view of the caller's notifications.
///
/// Socket events and REST responses both carry the server's unread count, so
/// the counter is always overwritten, never incremented. Applying the same
/// event twice therefore leaves the state unchanged.
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    /// Newest first.
    items: Vec<NotificationPayload>,
    unread_count: i64,
}

impl NotificationState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications, newest first.
    pub fn items(&self) -> &[NotificationPayload] {
        &self.items
    }

    /// Returns the unread count last reported by the server.
    pub const fn unread_count(&self) -> i64 {
        self.unread_count
    }

    /// Finds a notification by id.
    pub fn get(&self, id: Uuid) -> Option<&NotificationPayload> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Applies a pushed event. Returns whether anything changed.
    ///
    /// Room events (`project:*`) and errors never touch this state.
    pub fn apply_event(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::NotificationNew {
                notification,
                unread_count,
            } => {
                let inserted = self.insert(notification.clone());
                self.set_count(*unread_count) || inserted
            }
            ServerEvent::NotificationRead {
                notification_id,
                unread_count,
            } => {
                let marked = self.mark_read(*notification_id);
                self.set_count(*unread_count) || marked
            }
            ServerEvent::NotificationDeleted {
                notification_id,
                unread_count,
            } => {
                let removed = self.remove(*notification_id);
                self.set_count(*unread_count) || removed
            }
            ServerEvent::NotificationsAllRead { unread_count } => {
                let marked = self.mark_all_read();
                self.set_count(*unread_count) || marked
            }
            _ => false,
        }
    }

    /// Replaces the state with a fetched page.
    ///
    /// Used by the polling fallback to correct missed pushes.
    pub fn replace(&mut self, page: NotificationsPage) {
        self.items = page.notifications;
        self.items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.unread_count = page.unread_count;
    }

    /// Applies the unread count from `GET /notifications/unread-count`.
    pub fn apply_unread_count(&mut self, unread_count: i64) -> bool {
        self.set_count(unread_count)
    }

    /// Applies a `PATCH /notifications/{id}/read` response.
    pub fn apply_read(&mut self, response: &NotificationRead) -> bool {
        let marked = self.mark_read(response.notification.id);
        self.set_count(response.unread_count) || marked
    }

    /// Applies a `PATCH /notifications/mark-all-read` response.
    pub fn apply_all_read(&mut self, response: &AllRead) -> bool {
        let marked = self.mark_all_read();
        self.set_count(response.unread_count) || marked
    }

    /// Applies a `DELETE /notifications/{id}` response.
    pub fn apply_deleted(&mut self, response: &NotificationDeleted) -> bool {
        let removed = self.remove(response.notification_id);
        self.set_count(response.unread_count) || removed
    }

    fn set_count(&mut self, unread_count: i64) -> bool {
        let unread_count = unread_count.max(0);
        let changed = self.unread_count != unread_count;
        self.unread_count = unread_count;
        changed
    }

    fn insert(&mut self, notification: NotificationPayload) -> bool {
        if self.get(notification.id).is_some() {
            return false;
        }
        let at = self
            .items
            .iter()
            .position(|item| item.created_at < notification.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(at, notification);
        true
    }

    fn mark_read(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if !item.is_read => {
                item.is_read = true;
                true
            }
            _ => false,
        }
    }

    fn mark_all_read(&mut self) -> bool {
        let mut changed = false;
        for item in self.items.iter_mut().filter(|item| !item.is_read) {
            item.is_read = true;
            changed = true;
        }
        changed
    }

    fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }
}

/// Notification state kept current from pushes, REST calls and polling.
#[derive(Debug, Default)]
pub struct NotificationSync {
    state: NotificationState,
    schedule: PollSchedule,
    filter: NotificationFilter,
}

impl NotificationSync {
    /// Creates a sync with the given polling schedule.
    pub fn new(schedule: PollSchedule) -> Self {
        Self {
            state: NotificationState::new(),
            schedule,
            filter: NotificationFilter::default(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Returns the polling schedule.
    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Applies a pushed event.
    pub fn apply_event(&mut self, event: &ServerEvent) -> bool {
        self.state.apply_event(event)
    }

    /// Records that the window regained focus; the next poll runs at once.
    pub fn on_focus_regained(&mut self) {
        self.schedule.on_focus_regained();
    }

    /// Refetches the first page when the schedule says so.
    ///
    /// Returns whether a refresh ran. A failed refresh also restarts the
    /// interval.
    pub async fn refresh_if_due(&mut self, api: &ApiClient) -> Result<bool> {
        let now = Instant::now();
        if !self.schedule.is_due(now) {
            return Ok(false);
        }

        self.schedule.mark_refreshed(now);
        let page = api.list_notifications(&self.filter).await.inspect_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %error,
                "notification refresh failed"
            );
        })?;
        self.state.replace(page);
        Ok(true)
    }

    /// Marks one notification as read.
    pub async fn mark_read(&mut self, api: &ApiClient, notification_id: Uuid) -> Result<()> {
        let response = api.mark_read(notification_id).await?;
        self.state.apply_read(&response);
        Ok(())
    }

    /// Marks every notification as read.
    pub async fn mark_all_read(&mut self, api: &ApiClient) -> Result<()> {
        let response = api.mark_all_read().await?;
        self.state.apply_all_read(&response);
        Ok(())
    }

    /// Deletes a notification.
    pub async fn delete(&mut self, api: &ApiClient, notification_id: Uuid) -> Result<()> {
        let response = api.delete_notification(notification_id).await?;
        self.state.apply_deleted(&response);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jiff::{SignedDuration, Timestamp};
    use sprintify_core::{NotificationPriority, NotificationType};

    use super::*;

    pub(crate) fn notification(id: u128, age_secs: i64) -> NotificationPayload {
        NotificationPayload {
            id: Uuid::from_u128(id),
            title: format!("Notification {id}"),
            message: String::new(),
            notification_type: NotificationType::TaskAssigned,
            priority: NotificationPriority::Medium,
            recipient_id: Uuid::from_u128(1),
            sender_id: None,
            is_read: false,
            metadata: serde_json::Value::Null,
            action_url: None,
            email_sent: false,
            created_at: Timestamp::UNIX_EPOCH + SignedDuration::from_secs(1_000 - age_secs),
        }
    }

    fn new_event(id: u128, age_secs: i64, unread_count: i64) -> ServerEvent {
        ServerEvent::NotificationNew {
            notification: notification(id, age_secs),
            unread_count,
        }
    }

    #[test]
    fn new_notification_is_idempotent() {
        let mut state = NotificationState::new();
        let event = new_event(10, 0, 1);

        assert!(state.apply_event(&event));
        assert!(!state.apply_event(&event));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn keeps_newest_first() {
        let mut state = NotificationState::new();
        state.apply_event(&new_event(10, 50, 1));
        state.apply_event(&new_event(11, 10, 2));
        state.apply_event(&new_event(12, 30, 3));

        let ids: Vec<_> = state.items().iter().map(|n| n.id.as_u128()).collect();
        assert_eq!(ids, vec![11, 12, 10]);
    }

    #[test]
    fn read_and_delete_track_server_count() {
        let mut state = NotificationState::new();
        state.apply_event(&new_event(10, 0, 1));
        state.apply_event(&new_event(11, 0, 2));

        let read = ServerEvent::NotificationRead {
            notification_id: Uuid::from_u128(10),
            unread_count: 1,
        };
        assert!(state.apply_event(&read));
        assert!(!state.apply_event(&read));
        assert!(state.get(Uuid::from_u128(10)).is_some_and(|n| n.is_read));

        let deleted = ServerEvent::NotificationDeleted {
            notification_id: Uuid::from_u128(11),
            unread_count: 0,
        };
        assert!(state.apply_event(&deleted));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.unread_count(), 0);
    }

    #[test]
    fn all_read_marks_everything() {
        let mut state = NotificationState::new();
        state.apply_event(&new_event(10, 0, 1));
        state.apply_event(&new_event(11, 0, 2));

        assert!(state.apply_event(&ServerEvent::NotificationsAllRead { unread_count: 0 }));
        assert!(state.items().iter().all(|n| n.is_read));
        assert!(!state.apply_event(&ServerEvent::NotificationsAllRead { unread_count: 0 }));
    }

    #[test]
    fn room_events_are_ignored() {
        let mut state = NotificationState::new();
        let event = ServerEvent::ProjectJoined {
            project_id: Uuid::nil(),
        };
        assert!(!state.apply_event(&event));
    }

    #[test]
    fn poll_replaces_missed_pushes() {
        let mut state = NotificationState::new();
        state.apply_event(&new_event(10, 0, 1));

        state.replace(NotificationsPage {
            notifications: vec![notification(20, 40), notification(21, 20)],
            unread_count: 2,
            pagination: None,
        });

        let ids: Vec<_> = state.items().iter().map(|n| n.id.as_u128()).collect();
        assert_eq!(ids, vec![21, 20]);
        assert_eq!(state.unread_count(), 2);
    }
}
