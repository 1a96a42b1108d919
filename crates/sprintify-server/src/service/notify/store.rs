//! Persistence seam of the notification dispatcher.

use std::future::Future;

use sprintify_postgres::model::{NewNotification, Notification};
use sprintify_postgres::query::{
    AccountRepository, NotificationRepository, ProjectMemberRepository,
};
use sprintify_postgres::{PgConn, PgConnection, PgResult};
use uuid::Uuid;

/// Storage operations the dispatcher and its email worker rely on.
///
/// Implemented for database connections and, in tests, for an in-memory table.
pub trait NotificationStore: Send {
    /// Persists a new notification row.
    fn insert_notification(
        &mut self,
        notification: NewNotification,
    ) -> impl Future<Output = PgResult<Notification>> + Send;

    /// Counts the recipient's unread notifications from source.
    fn unread_count(&mut self, recipient_id: Uuid) -> impl Future<Output = PgResult<i64>> + Send;

    /// Marks one notification read; `None` if the recipient has no such row.
    fn mark_read(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Notification>>> + Send;

    /// Marks every notification of the recipient read; returns rows changed.
    fn mark_all_read(&mut self, recipient_id: Uuid)
    -> impl Future<Output = PgResult<usize>> + Send;

    /// Deletes one of the recipient's notifications; returns whether it existed.
    fn delete_notification(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Records a delivered escalation email.
    fn mark_email_sent(&mut self, notification_id: Uuid)
    -> impl Future<Output = PgResult<()>> + Send;

    /// Returns the email address of an account, if it exists.
    fn recipient_email(
        &mut self,
        recipient_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<String>>> + Send;

    /// Returns the ids of every member of a project.
    fn project_member_ids(
        &mut self,
        project_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Uuid>>> + Send;
}

impl NotificationStore for PgConnection {
    async fn insert_notification(&mut self, notification: NewNotification) -> PgResult<Notification> {
        self.create_notification(notification).await
    }

    async fn unread_count(&mut self, recipient_id: Uuid) -> PgResult<i64> {
        self.count_unread_notifications(recipient_id).await
    }

    async fn mark_read(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<Option<Notification>> {
        self.mark_notification_as_read(recipient_id, notification_id)
            .await
    }

    async fn mark_all_read(&mut self, recipient_id: Uuid) -> PgResult<usize> {
        self.mark_all_notifications_as_read(recipient_id).await
    }

    async fn delete_notification(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<bool> {
        self.delete_recipient_notification(recipient_id, notification_id)
            .await
    }

    async fn mark_email_sent(&mut self, notification_id: Uuid) -> PgResult<()> {
        self.mark_notification_email_sent(notification_id).await
    }

    async fn recipient_email(&mut self, recipient_id: Uuid) -> PgResult<Option<String>> {
        let account = self.find_account_by_id(recipient_id).await?;
        Ok(account.map(|account| account.email_address))
    }

    async fn project_member_ids(&mut self, project_id: Uuid) -> PgResult<Vec<Uuid>> {
        self.list_member_account_ids(project_id).await
    }
}

macro_rules! delegate_to_connection {
    ($($method:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)+) => {
        impl NotificationStore for PgConn {
            $(
                async fn $method(&mut self, $($arg: $ty),*) -> PgResult<$ret> {
                    let conn: &mut PgConnection = self;
                    NotificationStore::$method(conn, $($arg),*).await
                }
            )+
        }
    };
}

delegate_to_connection! {
    insert_notification(notification: NewNotification) -> Notification;
    unread_count(recipient_id: Uuid) -> i64;
    mark_read(recipient_id: Uuid, notification_id: Uuid) -> Option<Notification>;
    mark_all_read(recipient_id: Uuid) -> usize;
    delete_notification(recipient_id: Uuid, notification_id: Uuid) -> bool;
    mark_email_sent(notification_id: Uuid) -> ();
    recipient_email(recipient_id: Uuid) -> Option<String>;
    project_member_ids(project_id: Uuid) -> Vec<Uuid>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory [`NotificationStore`] for dispatcher tests.

    use std::collections::HashMap;

    use jiff::Timestamp;

    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        pub rows: Vec<Notification>,
        pub emails: HashMap<Uuid, String>,
        pub members: HashMap<Uuid, Vec<Uuid>>,
        pub fail_inserts: bool,
    }

    impl MemoryStore {
        pub fn row(&self, notification_id: Uuid) -> Option<&Notification> {
            self.rows.iter().find(|row| row.id == notification_id)
        }
    }

    impl NotificationStore for MemoryStore {
        async fn insert_notification(
            &mut self,
            notification: NewNotification,
        ) -> PgResult<Notification> {
            if self.fail_inserts {
                return Err(sprintify_postgres::PgError::Unexpected(
                    "insert refused".into(),
                ));
            }

            let row = Notification {
                id: Uuid::now_v7(),
                recipient_id: notification.recipient_id,
                sender_id: notification.sender_id,
                project_id: notification.project_id,
                notify_type: notification.notify_type,
                priority: notification.priority,
                title: notification.title,
                message: notification.message,
                is_read: false,
                read_at: None,
                metadata: notification.metadata,
                action_url: notification.action_url,
                email_sent: false,
                created_at: Timestamp::now().into(),
            };
            self.rows.push(row.clone());
            Ok(row)
        }

        async fn unread_count(&mut self, recipient_id: Uuid) -> PgResult<i64> {
            let count = self
                .rows
                .iter()
                .filter(|row| row.recipient_id == recipient_id && !row.is_read)
                .count();
            Ok(count as i64)
        }

        async fn mark_read(
            &mut self,
            recipient_id: Uuid,
            notification_id: Uuid,
        ) -> PgResult<Option<Notification>> {
            let row = self
                .rows
                .iter_mut()
                .find(|row| row.id == notification_id && row.recipient_id == recipient_id);

            Ok(row.map(|row| {
                if !row.is_read {
                    row.is_read = true;
                    row.read_at = Some(Timestamp::now().into());
                }
                row.clone()
            }))
        }

        async fn mark_all_read(&mut self, recipient_id: Uuid) -> PgResult<usize> {
            let mut changed = 0;
            for row in &mut self.rows {
                if row.recipient_id == recipient_id && !row.is_read {
                    row.is_read = true;
                    row.read_at = Some(Timestamp::now().into());
                    changed += 1;
                }
            }
            Ok(changed)
        }

        async fn delete_notification(
            &mut self,
            recipient_id: Uuid,
            notification_id: Uuid,
        ) -> PgResult<bool> {
            let before = self.rows.len();
            self.rows
                .retain(|row| !(row.id == notification_id && row.recipient_id == recipient_id));
            Ok(self.rows.len() != before)
        }

        async fn mark_email_sent(&mut self, notification_id: Uuid) -> PgResult<()> {
            if let Some(row) = self.rows.iter_mut().find(|row| row.id == notification_id) {
                row.email_sent = true;
            }
            Ok(())
        }

        async fn recipient_email(&mut self, recipient_id: Uuid) -> PgResult<Option<String>> {
            Ok(self.emails.get(&recipient_id).cloned())
        }

        async fn project_member_ids(&mut self, project_id: Uuid) -> PgResult<Vec<Uuid>> {
            Ok(self.members.get(&project_id).cloned().unwrap_or_default())
        }
    }
}
