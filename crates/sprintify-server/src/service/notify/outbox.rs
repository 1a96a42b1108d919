//! Email escalation queue and its background worker.
//!
//! The dispatcher only enqueues; the worker sends with a timeout and flips
//! `email_sent` after the provider accepts. Any failure leaves the flag false
//! so the row can be picked up again later.

use std::sync::Arc;
use std::time::Duration;

use sprintify_mailer::{EmailMessage, EmailService};
use sprintify_postgres::PgClient;
use sprintify_postgres::model::Notification;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::NotificationStore;

/// Tracing target for email escalation.
const TRACING_TARGET: &str = "sprintify_server::service::notify::outbox";

/// Emails sent in parallel by one worker.
const MAX_CONCURRENT_SENDS: usize = 8;

/// An escalation email waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJob {
    pub notification_id: Uuid,
    pub recipient_id: Uuid,
    pub subject: String,
    pub body: String,
}

impl EmailJob {
    /// Builds the job escalating a persisted notification.
    pub fn for_notification(notification: &Notification) -> Self {
        let body = match &notification.action_url {
            Some(url) => format!("{}\n\n{url}", notification.message),
            None => notification.message.clone(),
        };

        Self {
            notification_id: notification.id,
            recipient_id: notification.recipient_id,
            subject: notification.title.clone(),
            body,
        }
    }
}

/// Sending half of the escalation queue.
#[derive(Debug, Clone)]
pub struct EmailOutbox {
    sender: Sender<EmailJob>,
}

impl EmailOutbox {
    /// Creates a bounded queue holding up to `capacity` jobs.
    pub fn channel(capacity: usize) -> (Self, Receiver<EmailJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueues a job without waiting.
    ///
    /// Returns `false` when the queue is full or the worker has stopped.
    pub fn enqueue(&self, job: EmailJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    notification_id = %job.notification_id,
                    "email queue full, escalation skipped"
                );
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    notification_id = %job.notification_id,
                    "email worker stopped, escalation skipped"
                );
                false
            }
        }
    }
}

/// Sends one escalation email and records the delivery.
///
/// Returns `true` only when the provider accepted the message within
/// `timeout` and the flag was stored.
pub async fn deliver<S>(
    store: &mut S,
    mailer: &EmailService,
    job: &EmailJob,
    timeout: Duration,
) -> bool
where
    S: NotificationStore + ?Sized,
{
    let email = match store.recipient_email(job.recipient_id).await {
        Ok(Some(email)) => email,
        Ok(None) => {
            tracing::warn!(
                target: TRACING_TARGET,
                notification_id = %job.notification_id,
                recipient_id = %job.recipient_id,
                "recipient has no account, escalation skipped"
            );
            return false;
        }
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                notification_id = %job.notification_id,
                error = %error,
                "failed to resolve recipient email"
            );
            return false;
        }
    };

    let message = EmailMessage::new(email, &job.subject, &job.body)
        .with_notification(job.notification_id);

    match tokio::time::timeout(timeout, mailer.send(&message)).await {
        Ok(Ok(_receipt)) => {}
        Ok(Err(error)) => {
            tracing::warn!(
                target: TRACING_TARGET,
                notification_id = %job.notification_id,
                error = %error,
                "escalation email failed"
            );
            return false;
        }
        Err(_) => {
            tracing::warn!(
                target: TRACING_TARGET,
                notification_id = %job.notification_id,
                timeout_secs = timeout.as_secs(),
                "escalation email timed out"
            );
            return false;
        }
    }

    if let Err(error) = store.mark_email_sent(job.notification_id).await {
        tracing::warn!(
            target: TRACING_TARGET,
            notification_id = %job.notification_id,
            error = %error,
            "email sent but flag not stored"
        );
        return false;
    }

    tracing::info!(
        target: TRACING_TARGET,
        notification_id = %job.notification_id,
        recipient_id = %job.recipient_id,
        "escalation email sent"
    );
    true
}

/// Background task draining the escalation queue.
pub struct EmailWorker {
    receiver: Receiver<EmailJob>,
    postgres: PgClient,
    mailer: EmailService,
    timeout: Duration,
    cancel_token: CancellationToken,
    semaphore: Arc<Semaphore>,
}

impl EmailWorker {
    /// Creates a worker for the receiving half of an [`EmailOutbox`].
    pub fn new(
        receiver: Receiver<EmailJob>,
        postgres: PgClient,
        mailer: EmailService,
        timeout: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            postgres,
            mailer,
            timeout,
            cancel_token,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_SENDS)),
        }
    }

    /// Spawns the worker loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    #[tracing::instrument(skip_all, target = TRACING_TARGET, name = "email_worker")]
    async fn run(mut self) {
        tracing::info!(
            target: TRACING_TARGET,
            provider = self.mailer.provider_name(),
            "email worker started"
        );

        loop {
            let job = tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => break,
                job = self.receiver.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            let Ok(permit) = self.semaphore.clone().acquire_owned().await else {
                break;
            };

            let postgres = self.postgres.clone();
            let mailer = self.mailer.clone();
            let timeout = self.timeout;

            tokio::spawn(async move {
                let _permit = permit;
                match postgres.get_connection().await {
                    Ok(mut conn) => {
                        deliver(&mut conn, &mailer, &job, timeout).await;
                    }
                    Err(error) => tracing::warn!(
                        target: TRACING_TARGET,
                        notification_id = %job.notification_id,
                        error = %error,
                        "database unavailable, escalation skipped"
                    ),
                }
            });
        }

        tracing::info!(target: TRACING_TARGET, "email worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use sprintify_core::{NotificationPriority, NotificationType};
    use sprintify_mailer::{EmailProvider, EmailReceipt, Error, ErrorKind, Result};
    use sprintify_postgres::model::NewNotification;

    use super::*;
    use crate::service::notify::store::fake::MemoryStore;

    /// Provider that keeps every accepted message; clones share the log.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<EmailMessage>>>);

    impl Recorder {
        fn sent(&self) -> Vec<EmailMessage> {
            self.0.lock().map(|sent| sent.clone()).unwrap_or_default()
        }
    }

    #[async_trait::async_trait]
    impl EmailProvider for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt> {
            if let Ok(mut sent) = self.0.lock() {
                sent.push(message.clone());
            }
            Ok(EmailReceipt::now(message.message_id, self.name()))
        }
    }

    struct Refusing;

    #[async_trait::async_trait]
    impl EmailProvider for Refusing {
        fn name(&self) -> &'static str {
            "refusing"
        }

        async fn send(&self, _: &EmailMessage) -> Result<EmailReceipt> {
            Err(Error::new(ErrorKind::Rejected))
        }
    }

    struct Stalling;

    #[async_trait::async_trait]
    impl EmailProvider for Stalling {
        fn name(&self) -> &'static str {
            "stalling"
        }

        async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(EmailReceipt::now(message.message_id, self.name()))
        }
    }

    async fn persisted_job(store: &mut MemoryStore) -> EmailJob {
        let recipient_id = Uuid::now_v7();
        store.emails.insert(recipient_id, "ada@example.com".into());

        let row = store
            .insert_notification(NewNotification {
                recipient_id,
                sender_id: None,
                project_id: None,
                notify_type: NotificationType::ProjectInvitation,
                priority: NotificationPriority::High,
                title: "You were invited".into(),
                message: "Join the Roadmap project".into(),
                metadata: serde_json::json!({}),
                action_url: Some("/projects/roadmap".into()),
            })
            .await
            .unwrap();

        EmailJob::for_notification(&row)
    }

    #[tokio::test]
    async fn accepted_email_sets_flag() {
        let mut store = MemoryStore::default();
        let job = persisted_job(&mut store).await;
        let recorder = Recorder::default();
        let mailer = EmailService::new(recorder.clone());

        assert!(deliver(&mut store, &mailer, &job, Duration::from_secs(5)).await);
        assert!(store.row(job.notification_id).unwrap().email_sent);

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert!(sent[0].body.ends_with("/projects/roadmap"));
        assert_eq!(sent[0].notification_id, Some(job.notification_id));
    }

    #[tokio::test]
    async fn refused_email_leaves_flag_false() {
        let mut store = MemoryStore::default();
        let job = persisted_job(&mut store).await;
        let mailer = EmailService::new(Refusing);

        assert!(!deliver(&mut store, &mailer, &job, Duration::from_secs(5)).await);
        assert!(!store.row(job.notification_id).unwrap().email_sent);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_email_times_out() {
        let mut store = MemoryStore::default();
        let job = persisted_job(&mut store).await;
        let mailer = EmailService::new(Stalling);

        assert!(!deliver(&mut store, &mailer, &job, Duration::from_secs(10)).await);
        assert!(!store.row(job.notification_id).unwrap().email_sent);
    }

    #[tokio::test]
    async fn full_queue_rejects_without_blocking() {
        let (outbox, mut receiver) = EmailOutbox::channel(1);
        let mut store = MemoryStore::default();
        let job = persisted_job(&mut store).await;

        assert!(outbox.enqueue(job.clone()));
        assert!(!outbox.enqueue(job.clone()));
        assert_eq!(receiver.recv().await, Some(job));
    }
}
