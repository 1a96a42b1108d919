//! Notification dispatcher.
//!
//! Every notification goes through the same sequence: persist the row, count
//! the recipient's unread rows, push to their live connections, and queue an
//! escalation email where the priority or type calls for one. Only the first
//! step may fail the caller; the rest are logged and swallowed.

mod outbox;
mod store;

use std::time::Duration;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use serde::{Deserialize, Serialize};
use sprintify_core::{
    NotificationPayload, NotificationPriority, NotificationType, ServerEvent, requires_email,
};
use sprintify_postgres::PgResult;
use sprintify_postgres::model::{NewNotification, Notification};
use uuid::Uuid;

pub use self::outbox::{EmailJob, EmailOutbox, EmailWorker, deliver};
pub use self::store::NotificationStore;
#[cfg(test)]
pub(crate) use self::store::fake;
use super::sessions::{DEFAULT_CHANNEL_CAPACITY, SessionRegistry};

/// Tracing target for notification dispatch.
const TRACING_TARGET: &str = "sprintify_server::service::notify";

/// Default timeout for a single escalation email, in seconds.
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 10;

/// Default capacity of the escalation email queue.
const DEFAULT_EMAIL_QUEUE_CAPACITY: usize = 256;

/// Configuration of notification delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct DispatcherConfig {
    /// Seconds to wait for the email provider before giving up on a send.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "notification-email-timeout",
            env = "NOTIFICATION_EMAIL_TIMEOUT",
            default_value_t = DEFAULT_EMAIL_TIMEOUT_SECS
        )
    )]
    #[serde(default = "DispatcherConfig::default_email_timeout")]
    pub notification_email_timeout: u64,

    /// Outbound frames buffered per realtime connection.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "session-channel-capacity",
            env = "SESSION_CHANNEL_CAPACITY",
            default_value_t = DEFAULT_CHANNEL_CAPACITY
        )
    )]
    #[serde(default = "DispatcherConfig::default_channel_capacity")]
    pub session_channel_capacity: usize,

    /// Escalation emails buffered before new ones are dropped.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "notification-email-queue",
            env = "NOTIFICATION_EMAIL_QUEUE",
            default_value_t = DEFAULT_EMAIL_QUEUE_CAPACITY
        )
    )]
    #[serde(default = "DispatcherConfig::default_email_queue")]
    pub notification_email_queue: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            notification_email_timeout: DEFAULT_EMAIL_TIMEOUT_SECS,
            session_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            notification_email_queue: DEFAULT_EMAIL_QUEUE_CAPACITY,
        }
    }
}

impl DispatcherConfig {
    /// Returns the per-email send timeout.
    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_email_timeout.max(1))
    }

    fn default_email_timeout() -> u64 {
        DEFAULT_EMAIL_TIMEOUT_SECS
    }

    fn default_channel_capacity() -> usize {
        DEFAULT_CHANNEL_CAPACITY
    }

    fn default_email_queue() -> usize {
        DEFAULT_EMAIL_QUEUE_CAPACITY
    }
}

/// A notification addressed to every member of a project.
#[derive(Debug, Clone)]
pub struct ProjectNotice {
    pub project_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub notify_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub action_url: Option<String>,
}

impl ProjectNotice {
    fn addressed_to(&self, recipient_id: Uuid) -> NewNotification {
        NewNotification {
            recipient_id,
            sender_id: self.sender_id,
            project_id: Some(self.project_id),
            notify_type: self.notify_type,
            priority: self.priority,
            title: self.title.clone(),
            message: self.message.clone(),
            metadata: self.metadata.clone(),
            action_url: self.action_url.clone(),
        }
    }
}

/// Persists notifications and fans them out to sessions and email.
///
/// Cloning is cheap and clones share the registry and the outbox.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sessions: SessionRegistry,
    outbox: EmailOutbox,
}

impl NotificationDispatcher {
    /// Creates a dispatcher delivering through `sessions` and `outbox`.
    pub fn new(sessions: SessionRegistry, outbox: EmailOutbox) -> Self {
        Self { sessions, outbox }
    }

    /// Returns the session registry used for realtime delivery.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Creates a notification for a single recipient.
    ///
    /// Fails only when the row cannot be persisted.
    pub async fn notify<S>(&self, store: &mut S, notification: NewNotification) -> PgResult<Notification>
    where
        S: NotificationStore + ?Sized,
    {
        let row = match store.insert_notification(notification).await {
            Ok(row) => row,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "failed to persist notification"
                );
                return Err(error);
            }
        };

        tracing::info!(
            target: TRACING_TARGET,
            notification_id = %row.id,
            recipient_id = %row.recipient_id,
            notify_type = %row.notify_type,
            priority = %row.priority,
            "notification created"
        );

        if let Some(unread_count) = self.recount(store, row.recipient_id).await {
            let event = ServerEvent::NotificationNew {
                notification: payload(&row),
                unread_count,
            };
            self.push(row.recipient_id, &event).await;
        }

        if !row.email_sent && requires_email(row.notify_type, row.priority) {
            self.outbox.enqueue(EmailJob::for_notification(&row));
        }

        Ok(row)
    }

    /// Creates one notification per project member and broadcasts to the room.
    ///
    /// Returns the rows that were persisted; a member whose row fails is
    /// logged and skipped.
    pub async fn notify_project<S>(&self, store: &mut S, notice: ProjectNotice) -> PgResult<Vec<Notification>>
    where
        S: NotificationStore + ?Sized,
    {
        let member_ids = store.project_member_ids(notice.project_id).await?;

        let mut rows = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            match self.notify(store, notice.addressed_to(member_id)).await {
                Ok(row) => rows.push(row),
                Err(error) => tracing::warn!(
                    target: TRACING_TARGET,
                    project_id = %notice.project_id,
                    recipient_id = %member_id,
                    error = %error,
                    "skipped project notification for member"
                ),
            }
        }

        let event = ServerEvent::ProjectNotification {
            project_id: notice.project_id,
            title: notice.title,
            message: notice.message,
            notification_type: notice.notify_type,
            metadata: notice.metadata,
        };
        let delivered = self.sessions.broadcast_room(notice.project_id, &event).await;

        tracing::debug!(
            target: TRACING_TARGET,
            project_id = %notice.project_id,
            recipients = rows.len(),
            room_connections = delivered,
            "project notification dispatched"
        );

        Ok(rows)
    }

    /// Marks one notification read and pushes the fresh count.
    ///
    /// Marking an already read notification succeeds without changes.
    /// Returns `None` when the recipient has no such notification.
    pub async fn mark_read<S>(
        &self,
        store: &mut S,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<Option<(Notification, i64)>>
    where
        S: NotificationStore + ?Sized,
    {
        let Some(row) = store.mark_read(recipient_id, notification_id).await? else {
            return Ok(None);
        };

        let unread_count = store.unread_count(recipient_id).await?;
        let event = ServerEvent::NotificationRead {
            notification_id,
            unread_count,
        };
        self.push(recipient_id, &event).await;

        Ok(Some((row, unread_count)))
    }

    /// Marks every notification of the recipient read and pushes the count.
    ///
    /// Returns the number of rows changed and the recomputed count.
    pub async fn mark_all_read<S>(&self, store: &mut S, recipient_id: Uuid) -> PgResult<(usize, i64)>
    where
        S: NotificationStore + ?Sized,
    {
        let changed = store.mark_all_read(recipient_id).await?;
        let unread_count = store.unread_count(recipient_id).await?;

        let event = ServerEvent::NotificationsAllRead { unread_count };
        self.push(recipient_id, &event).await;

        tracing::info!(
            target: TRACING_TARGET,
            recipient_id = %recipient_id,
            changed,
            "notifications marked as read"
        );

        Ok((changed, unread_count))
    }

    /// Deletes one notification and pushes the fresh count.
    ///
    /// Returns `None` when the recipient has no such notification.
    pub async fn delete<S>(
        &self,
        store: &mut S,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<Option<i64>>
    where
        S: NotificationStore + ?Sized,
    {
        if !store.delete_notification(recipient_id, notification_id).await? {
            return Ok(None);
        }

        let unread_count = store.unread_count(recipient_id).await?;
        let event = ServerEvent::NotificationDeleted {
            notification_id,
            unread_count,
        };
        self.push(recipient_id, &event).await;

        Ok(Some(unread_count))
    }

    async fn recount<S>(&self, store: &mut S, recipient_id: Uuid) -> Option<i64>
    where
        S: NotificationStore + ?Sized,
    {
        match store.unread_count(recipient_id).await {
            Ok(count) => Some(count),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    recipient_id = %recipient_id,
                    error = %error,
                    "failed to count unread notifications, push skipped"
                );
                None
            }
        }
    }

    async fn push(&self, recipient_id: Uuid, event: &ServerEvent) {
        let delivered = self.sessions.send_to_account(recipient_id, event).await;
        tracing::debug!(
            target: TRACING_TARGET,
            recipient_id = %recipient_id,
            event = event.name(),
            delivered,
            "pushed to live connections"
        );
    }
}

/// Converts a stored notification into its wire representation.
pub fn payload(notification: &Notification) -> NotificationPayload {
    NotificationPayload {
        id: notification.id,
        title: notification.title.clone(),
        message: notification.message.clone(),
        notification_type: notification.notify_type,
        priority: notification.priority,
        recipient_id: notification.recipient_id,
        sender_id: notification.sender_id,
        is_read: notification.is_read,
        metadata: notification.metadata.clone(),
        action_url: notification.action_url.clone(),
        email_sent: notification.email_sent,
        created_at: notification.created_at.into(),
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::Receiver;

    use super::fake::MemoryStore;
    use super::*;

    fn dispatcher() -> (NotificationDispatcher, Receiver<EmailJob>) {
        let (outbox, jobs) = EmailOutbox::channel(8);
        let dispatcher = NotificationDispatcher::new(SessionRegistry::default(), outbox);
        (dispatcher, jobs)
    }

    fn new_notification(recipient_id: Uuid, priority: NotificationPriority) -> NewNotification {
        NewNotification {
            recipient_id,
            sender_id: None,
            project_id: None,
            notify_type: NotificationType::TaskAssigned,
            priority,
            title: "Assigned to you".into(),
            message: "SPR-12 was assigned to you".into(),
            metadata: serde_json::json!({ "issueKey": "SPR-12" }),
            action_url: None,
        }
    }

    #[tokio::test]
    async fn high_priority_for_offline_user_is_persisted_and_escalated() {
        let (dispatcher, mut jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let recipient = Uuid::now_v7();

        assert_eq!(store.unread_count(recipient).await.unwrap(), 0);
        let row = dispatcher
            .notify(&mut store, new_notification(recipient, NotificationPriority::High))
            .await
            .unwrap();

        assert!(!dispatcher.sessions().is_online(recipient).await);
        assert_eq!(store.unread_count(recipient).await.unwrap(), 1);
        assert!(!row.email_sent);

        let job = jobs.try_recv().unwrap();
        assert_eq!(job.notification_id, row.id);
        assert_eq!(job.recipient_id, recipient);
    }

    #[tokio::test]
    async fn low_priority_is_not_escalated() {
        let (dispatcher, mut jobs) = dispatcher();
        let mut store = MemoryStore::default();

        dispatcher
            .notify(&mut store, new_notification(Uuid::now_v7(), NotificationPriority::Medium))
            .await
            .unwrap();

        assert!(jobs.try_recv().is_err());
    }

    #[tokio::test]
    async fn online_recipient_receives_new_event_with_count() {
        let (dispatcher, _jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let recipient = Uuid::now_v7();
        let mut first = dispatcher.sessions().register(recipient, Uuid::now_v7()).await;
        let mut second = dispatcher.sessions().register(recipient, Uuid::now_v7()).await;

        let row = dispatcher
            .notify(&mut store, new_notification(recipient, NotificationPriority::Low))
            .await
            .unwrap();

        for receiver in [&mut first, &mut second] {
            match receiver.try_recv().unwrap() {
                ServerEvent::NotificationNew {
                    notification,
                    unread_count,
                } => {
                    assert_eq!(notification.id, row.id);
                    assert_eq!(unread_count, 1);
                }
                other => panic!("unexpected event {}", other.name()),
            }
        }
    }

    #[tokio::test]
    async fn persist_failure_is_fatal_and_pushes_nothing() {
        let (dispatcher, mut jobs) = dispatcher();
        let mut store = MemoryStore {
            fail_inserts: true,
            ..MemoryStore::default()
        };
        let recipient = Uuid::now_v7();
        let mut receiver = dispatcher.sessions().register(recipient, Uuid::now_v7()).await;

        let result = dispatcher
            .notify(&mut store, new_notification(recipient, NotificationPriority::Urgent))
            .await;

        assert!(result.is_err());
        assert!(receiver.try_recv().is_err());
        assert!(jobs.try_recv().is_err());
    }

    #[tokio::test]
    async fn mark_read_twice_keeps_count_and_succeeds() {
        let (dispatcher, _jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let recipient = Uuid::now_v7();

        let read = dispatcher
            .notify(&mut store, new_notification(recipient, NotificationPriority::Low))
            .await
            .unwrap();
        dispatcher
            .notify(&mut store, new_notification(recipient, NotificationPriority::Low))
            .await
            .unwrap();

        let (_, first) = dispatcher
            .mark_read(&mut store, recipient, read.id)
            .await
            .unwrap()
            .unwrap();
        let (row, second) = dispatcher
            .mark_read(&mut store, recipient, read.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert!(row.is_read);
    }

    #[tokio::test]
    async fn mark_read_of_foreign_notification_is_none() {
        let (dispatcher, _jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let owner = Uuid::now_v7();

        let row = dispatcher
            .notify(&mut store, new_notification(owner, NotificationPriority::Low))
            .await
            .unwrap();

        let other = dispatcher
            .mark_read(&mut store, Uuid::now_v7(), row.id)
            .await
            .unwrap();
        assert!(other.is_none());
        assert!(!store.row(row.id).unwrap().is_read);
    }

    #[tokio::test]
    async fn mark_all_read_then_count_is_zero() {
        let (dispatcher, _jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let recipient = Uuid::now_v7();

        for _ in 0..3 {
            dispatcher
                .notify(&mut store, new_notification(recipient, NotificationPriority::Low))
                .await
                .unwrap();
        }
        let mut receiver = dispatcher.sessions().register(recipient, Uuid::now_v7()).await;

        let (changed, unread_count) = dispatcher.mark_all_read(&mut store, recipient).await.unwrap();

        assert_eq!(changed, 3);
        assert_eq!(unread_count, 0);
        assert_eq!(store.unread_count(recipient).await.unwrap(), 0);
        assert_eq!(
            receiver.try_recv().unwrap(),
            ServerEvent::NotificationsAllRead { unread_count: 0 }
        );
    }

    #[tokio::test]
    async fn delete_recomputes_count() {
        let (dispatcher, _jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let recipient = Uuid::now_v7();

        let row = dispatcher
            .notify(&mut store, new_notification(recipient, NotificationPriority::Low))
            .await
            .unwrap();

        let count = dispatcher.delete(&mut store, recipient, row.id).await.unwrap();
        assert_eq!(count, Some(0));

        let again = dispatcher.delete(&mut store, recipient, row.id).await.unwrap();
        assert_eq!(again, None);
    }

    #[tokio::test]
    async fn project_notice_reaches_every_member_and_the_room() {
        let (dispatcher, _jobs) = dispatcher();
        let mut store = MemoryStore::default();
        let project_id = Uuid::now_v7();
        let members = [Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
        store.members.insert(project_id, members.to_vec());

        let connection = Uuid::now_v7();
        let mut receiver = dispatcher.sessions().register(Uuid::now_v7(), connection).await;
        assert!(dispatcher.sessions().join_room(connection, project_id).await);

        let rows = dispatcher
            .notify_project(&mut store, ProjectNotice {
                project_id,
                sender_id: Some(members[0]),
                notify_type: NotificationType::SprintStarted,
                priority: NotificationPriority::Medium,
                title: "Sprint 4 started".into(),
                message: "Sprint 4 is now active".into(),
                metadata: serde_json::json!({}),
                action_url: None,
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        for member in members {
            assert_eq!(store.unread_count(member).await.unwrap(), 1);
        }
        assert_eq!(
            receiver.try_recv().unwrap().name(),
            "project:notification"
        );
    }

    #[test]
    fn default_config_matches_arg_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            dispatcher: DispatcherConfig,
        }

        let parsed = Cli::parse_from(["sprintify"]).dispatcher;
        let defaults = DispatcherConfig::default();
        assert_eq!(parsed.notification_email_timeout, defaults.notification_email_timeout);
        assert_eq!(parsed.session_channel_capacity, defaults.session_channel_capacity);
        assert_eq!(defaults.email_timeout(), Duration::from_secs(10));
    }
}
