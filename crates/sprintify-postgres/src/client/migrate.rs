//! Embedded schema migrations.

use std::time::{Duration, Instant};

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Wall-clock time spent applying migrations.
    pub duration: Duration,
    /// Versions applied by this run, oldest first.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Creates a result for a completed run.
    pub fn new(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns whether the schema was already up to date.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }

    /// Returns the newest version applied by this run.
    pub fn last_processed_version(&self) -> Option<&str> {
        self.processed_versions.last().map(String::as_str)
    }
}

/// Adds migration support to [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every embedded migration that has not been applied yet.
    ///
    /// Safe to call on every startup.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;
}

impl PgClientMigrationExt for PgClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        tracing::info!(target: TRACING_TARGET_MIGRATION, "Starting database migrations");

        let start = Instant::now();
        let conn = self.get_pooled_connection().await?;
        let mut conn: AsyncConnectionWrapper<_> = conn.into();

        // The harness is synchronous and blocks on the wrapped async connection.
        let versions = spawn_blocking(move || {
            conn.run_pending_migrations(MIGRATIONS).map(|versions| {
                versions
                    .into_iter()
                    .map(|version| version.to_string())
                    .collect::<Vec<_>>()
            })
        })
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Migration task panicked"
            );
            PgError::Migration(err.into())
        })?
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Database migrations failed"
            );
            PgError::Migration(err)
        })?;

        let result = MigrationResult::new(start.elapsed(), versions);
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?result.duration,
            applied = result.processed_versions.len(),
            last_version = result.last_processed_version(),
            "Database migrations completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_is_no_op() {
        let result = MigrationResult::new(Duration::from_millis(5), vec![]);
        assert!(result.is_no_op());
        assert_eq!(result.last_processed_version(), None);
    }

    #[test]
    fn last_processed_version_is_newest() {
        let result = MigrationResult::new(
            Duration::from_millis(5),
            vec!["20260101000000".into(), "20260201000000".into()],
        );
        assert!(!result.is_no_op());
        assert_eq!(result.last_processed_version(), Some("20260201000000"));
    }
}
