use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use sprintify_mailer::{EmailService, MailerConfig};
use sprintify_postgres::{PgClient, PgClientMigrationExt, PgConfig};

use crate::service::{DispatcherConfig, SessionKeys, SessionKeysConfig};
use crate::{Error, Result};

/// Tracing target for service wiring.
const TRACING_TARGET: &str = "sprintify_server::service::config";

/// Configuration of every service held in [`ServiceState`].
///
/// [`ServiceState`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Postgres connection and pool settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// Token verification keys.
    #[cfg_attr(feature = "config", command(flatten))]
    pub session_keys: SessionKeysConfig,

    /// Realtime and email delivery settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Email provider settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub mailer: MailerConfig,
}

impl ServiceConfig {
    /// Creates a configuration with defaults around a database URL.
    pub fn new(postgres_url: impl Into<String>) -> Self {
        Self {
            postgres: PgConfig::new(postgres_url),
            session_keys: SessionKeysConfig::default(),
            dispatcher: DispatcherConfig::default(),
            mailer: MailerConfig::default(),
        }
    }

    /// Validates the parts that can be checked without I/O.
    pub fn validate(&self) -> Result<()> {
        self.postgres
            .validate()
            .map_err(|e| Error::config("invalid postgres configuration").with_source(e))?;
        self.session_keys.validate()
    }

    /// Builds the pool and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new(self.postgres.clone()).map_err(|e| {
            Error::database("failed to create the connection pool").with_source(e)
        })?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::database("failed to apply migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            database = %self.postgres.database_url_masked(),
            applied = migrations.processed_versions.len(),
            "database ready"
        );

        Ok(pg_client)
    }

    /// Loads the token keys from disk.
    pub async fn load_session_keys(&self) -> Result<SessionKeys> {
        SessionKeys::from_config(&self.session_keys).await
    }

    /// Builds the email provider.
    pub fn create_mailer(&self) -> Result<EmailService> {
        self.mailer
            .clone()
            .into_service()
            .map_err(|e| Error::mailer("failed to create the email provider").with_source(e))
    }

    /// Returns the per-email send timeout.
    pub fn email_timeout(&self) -> Duration {
        self.dispatcher.email_timeout()
    }
}
