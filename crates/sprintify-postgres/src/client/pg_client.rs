use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::Serialize;

use super::custom_hooks;
use crate::{
    ConnectionPool, PgConfig, PgConnection, PgError, PgResult, PooledConnection,
    TRACING_TARGET_CONNECTION,
};

/// Connection pool status information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PgPoolStatus {
    /// Maximum number of connections in the pool.
    pub max_size: usize,
    /// Current number of connections in the pool.
    pub size: usize,
    /// Number of idle connections.
    pub available: usize,
    /// Number of requests waiting for a connection.
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Returns the share of the pool currently checked out (0.0 to 1.0).
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }

        self.size.saturating_sub(self.available) as f64 / self.max_size as f64
    }

    /// Returns whether requests are queueing or the pool is nearly exhausted.
    #[inline]
    pub fn is_under_pressure(&self) -> bool {
        self.waiting > 0 || self.utilization() > 0.8
    }
}

/// Database client owning the connection pool.
///
/// Cloning is cheap: all clones share the same pool.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Creates a new client and its connection pool.
    ///
    /// No connection is opened until the first one is requested.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CONNECTION,
        fields(database_url = %config.database_url_masked())
    )]
    pub fn new(config: PgConfig) -> PgResult<Self> {
        tracing::info!(target: TRACING_TARGET_CONNECTION, "Initializing database client");

        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::setup_callback);
        let manager =
            AsyncDieselConnectionManager::new_with_config(&config.postgres_url, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .recycle_timeout(config.idle_timeout())
            .runtime(deadpool::Runtime::Tokio1)
            .post_create(Hook::sync_fn(custom_hooks::post_create))
            .pre_recycle(Hook::sync_fn(custom_hooks::pre_recycle))
            .post_recycle(Hook::sync_fn(custom_hooks::post_recycle))
            .build()
            .map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %err,
                    "Failed to create connection pool"
                );
                PgError::Unexpected(format!("failed to build connection pool: {err}").into())
            })?;

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Creates a new client and verifies that the database answers a trivial query.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CONNECTION,
        fields(database_url = %config.database_url_masked())
    )]
    pub async fn new_with_test(config: PgConfig) -> PgResult<Self> {
        let this = Self::new(config)?;
        let mut conn = this.get_pooled_connection().await?;

        #[derive(diesel::QueryableByName)]
        struct Ping {
            #[diesel(sql_type = diesel::sql_types::Integer)]
            #[allow(dead_code)]
            result: i32,
        }

        let _: Ping = diesel::sql_query("SELECT 1 AS result")
            .get_result(&mut *conn)
            .await
            .map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %err,
                    "Database connectivity test failed"
                );
                PgError::from(err)
            })?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            max_connections = this.inner.config.postgres_max_connections,
            "Database client initialized"
        );

        Ok(this)
    }

    /// Acquires a connection from the pool, waiting up to the configured timeout.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        let start = Instant::now();
        let conn = self.get_pooled_connection().await.inspect_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %err,
                elapsed = ?start.elapsed(),
                "Failed to acquire connection from pool"
            );
        })?;

        let elapsed = start.elapsed();
        if elapsed > Duration::from_millis(100) {
            tracing::warn!(
                target: TRACING_TARGET_CONNECTION,
                elapsed = ?elapsed,
                "Connection acquisition took longer than expected"
            );
        }

        Ok(PgConn::new(conn))
    }

    pub(crate) async fn get_pooled_connection(&self) -> PgResult<PooledConnection> {
        self.inner.pool.get().await.map_err(PgError::from)
    }

    /// Returns the current pool statistics.
    #[inline]
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.inner.pool.status();
        PgPoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    /// Returns the configuration this client was built with.
    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }

    /// Closes the pool: new requests fail and idle connections are dropped.
    pub fn close(&self) {
        tracing::info!(target: TRACING_TARGET_CONNECTION, "Closing database connection pool");
        self.inner.pool.close();
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.pool_status();
        f.debug_struct("PgClient")
            .field("database_url", &self.inner.config.database_url_masked())
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .field("available", &status.available)
            .field("waiting", &status.waiting)
            .finish()
    }
}

/// A pooled connection that implements every repository trait through
/// [`Deref`] to [`PgConnection`].
///
/// The connection returns to the pool when dropped.
///
/// ```ignore
/// let mut conn = pg_client.get_connection().await?;
/// let member = conn.find_project_member(project_id, account_id).await?;
/// ```
#[derive(Deref, DerefMut)]
pub struct PgConn {
    #[deref]
    #[deref_mut]
    conn: PooledConnection,
}

impl PgConn {
    /// Wraps a raw pooled connection.
    pub fn new(conn: PooledConnection) -> Self {
        Self { conn }
    }

    /// Runs `f` inside a transaction at the default isolation level.
    ///
    /// Commits when `f` returns `Ok` and rolls back otherwise.
    pub async fn transaction<'a, T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: for<'r> FnOnce(&'r mut PgConnection) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
            + Send
            + 'a,
        T: Send + 'a,
        E: From<diesel::result::Error> + Send + 'a,
    {
        let conn: &mut PgConnection = &mut self.conn;
        conn.transaction(f).await
    }

    /// Runs `f` inside a `SERIALIZABLE` transaction.
    ///
    /// Concurrent transactions that read and then write the same rows cannot
    /// both commit; the loser fails with a serialization error, see
    /// [`PgError::is_serialization_failure`].
    pub async fn serializable_transaction<'a, T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: for<'r> FnOnce(&'r mut PgConnection) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
            + Send
            + 'a,
        T: Send + 'a,
        E: From<diesel::result::Error> + Send + 'a,
    {
        let conn: &mut PgConnection = &mut self.conn;
        conn.build_transaction().serializable().run(f).await
    }
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_utilization() {
        let status = PgPoolStatus {
            max_size: 10,
            size: 8,
            available: 2,
            waiting: 0,
        };
        assert!((status.utilization() - 0.6).abs() < f64::EPSILON);

        let empty = PgPoolStatus {
            max_size: 0,
            size: 0,
            available: 0,
            waiting: 0,
        };
        assert_eq!(empty.utilization(), 0.0);
    }

    #[test]
    fn pool_pressure() {
        let saturated = PgPoolStatus {
            max_size: 10,
            size: 10,
            available: 1,
            waiting: 0,
        };
        assert!(saturated.is_under_pressure());

        let queueing = PgPoolStatus {
            max_size: 10,
            size: 5,
            available: 3,
            waiting: 2,
        };
        assert!(queueing.is_under_pressure());

        let idle = PgPoolStatus {
            max_size: 10,
            size: 5,
            available: 5,
            waiting: 0,
        };
        assert!(!idle.is_under_pressure());
    }
}
