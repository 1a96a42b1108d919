//! Background tasks owned by the service.

use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::service::{EmailJob, EmailWorker, ServiceState};

/// Tracing target for worker lifecycle.
const TRACING_TARGET: &str = "sprintify_server::service::worker";

/// Handles of spawned background tasks.
pub struct WorkerHandles {
    email: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl WorkerHandles {
    /// Spawns the email escalation worker draining `email_jobs`.
    pub fn spawn(state: &ServiceState, email_jobs: Receiver<EmailJob>) -> Self {
        let cancel_token = CancellationToken::new();

        let email = EmailWorker::new(
            email_jobs,
            state.postgres.clone(),
            state.mailer.clone(),
            state.email_timeout,
            cancel_token.clone(),
        )
        .spawn();

        Self {
            email,
            cancel_token,
        }
    }

    /// Asks every worker to stop after its current job.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Returns whether any worker has exited.
    pub fn any_finished(&self) -> bool {
        self.email.is_finished()
    }

    /// Cancels and waits for every worker.
    pub async fn wait_all(self) {
        self.cancel_token.cancel();
        if let Err(error) = self.email.await {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                "email worker panicked"
            );
        }
    }
}
