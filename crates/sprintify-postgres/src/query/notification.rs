//! Notification repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewNotification, Notification};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for notifications.
///
/// Every read and mutation other than creation is scoped by recipient: a
/// notification addressed to someone else behaves as if it did not exist.
pub trait NotificationRepository {
    /// Persists a new notification.
    fn create_notification(
        &mut self,
        notification: NewNotification,
    ) -> impl Future<Output = PgResult<Notification>> + Send;

    /// Finds a notification addressed to `recipient_id`.
    fn find_recipient_notification(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Notification>>> + Send;

    /// Lists a recipient's notifications, newest first.
    fn list_recipient_notifications(
        &mut self,
        recipient_id: Uuid,
        unread_only: bool,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<Notification>>> + Send;

    /// Counts a recipient's notifications.
    fn count_recipient_notifications(
        &mut self,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Counts a recipient's unread notifications.
    fn count_unread_notifications(
        &mut self,
        recipient_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Marks a notification read.
    ///
    /// Already-read notifications keep their original `read_at`. Returns
    /// `None` if the recipient has no such notification.
    fn mark_notification_as_read(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Notification>>> + Send;

    /// Marks every unread notification of a recipient read.
    ///
    /// Returns the number of rows changed.
    fn mark_all_notifications_as_read(
        &mut self,
        recipient_id: Uuid,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Deletes a recipient's notification; returns whether it existed.
    fn delete_recipient_notification(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Records that an escalation email was delivered.
    fn mark_notification_email_sent(
        &mut self,
        notification_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl NotificationRepository for PgConnection {
    async fn create_notification(&mut self, notification: NewNotification) -> PgResult<Notification> {
        use schema::notifications;

        diesel::insert_into(notifications::table)
            .values(&notification)
            .returning(Notification::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_recipient_notification(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<Option<Notification>> {
        use schema::notifications::{self, dsl};

        notifications::table
            .filter(dsl::id.eq(notification_id))
            .filter(dsl::recipient_id.eq(recipient_id))
            .select(Notification::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_recipient_notifications(
        &mut self,
        recipient_id: Uuid,
        unread_only: bool,
        pagination: Pagination,
    ) -> PgResult<Vec<Notification>> {
        use schema::notifications::{self, dsl};

        let mut query = notifications::table
            .filter(dsl::recipient_id.eq(recipient_id))
            .into_boxed();

        if unread_only {
            query = query.filter(dsl::is_read.eq(false));
        }

        query
            .order((dsl::created_at.desc(), dsl::id.desc()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Notification::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_recipient_notifications(
        &mut self,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> PgResult<i64> {
        use schema::notifications::{self, dsl};

        let mut query = notifications::table
            .filter(dsl::recipient_id.eq(recipient_id))
            .into_boxed();

        if unread_only {
            query = query.filter(dsl::is_read.eq(false));
        }

        query
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_unread_notifications(&mut self, recipient_id: Uuid) -> PgResult<i64> {
        self.count_recipient_notifications(recipient_id, true).await
    }

    async fn mark_notification_as_read(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<Option<Notification>> {
        use schema::notifications::{self, dsl};

        let now = jiff_diesel::Timestamp::from(Timestamp::now());

        diesel::update(
            notifications::table
                .filter(dsl::id.eq(notification_id))
                .filter(dsl::recipient_id.eq(recipient_id))
                .filter(dsl::is_read.eq(false)),
        )
        .set((dsl::is_read.eq(true), dsl::read_at.eq(Some(now))))
        .execute(self)
        .await
        .map_err(PgError::from)?;

        self.find_recipient_notification(recipient_id, notification_id)
            .await
    }

    async fn mark_all_notifications_as_read(&mut self, recipient_id: Uuid) -> PgResult<usize> {
        use schema::notifications::{self, dsl};

        let now = jiff_diesel::Timestamp::from(Timestamp::now());

        diesel::update(
            notifications::table
                .filter(dsl::recipient_id.eq(recipient_id))
                .filter(dsl::is_read.eq(false)),
        )
        .set((dsl::is_read.eq(true), dsl::read_at.eq(Some(now))))
        .execute(self)
        .await
        .map_err(PgError::from)
    }

    async fn delete_recipient_notification(
        &mut self,
        recipient_id: Uuid,
        notification_id: Uuid,
    ) -> PgResult<bool> {
        use schema::notifications::{self, dsl};

        let deleted = diesel::delete(
            notifications::table
                .filter(dsl::id.eq(notification_id))
                .filter(dsl::recipient_id.eq(recipient_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn mark_notification_email_sent(&mut self, notification_id: Uuid) -> PgResult<()> {
        use schema::notifications::{self, dsl};

        diesel::update(notifications::table.filter(dsl::id.eq(notification_id)))
            .set(dsl::email_sent.eq(true))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
