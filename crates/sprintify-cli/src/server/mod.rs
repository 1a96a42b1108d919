//! HTTP server startup and lifecycle management.
//!
//! On a shutdown signal the server stops accepting connections, closes every
//! realtime session so upgraded sockets drain, then waits up to the shutdown
//! timeout for in-flight requests and the email worker.

mod error;
mod shutdown;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::Router;
pub use error::{ServerError, ServerResult};
use sprintify_server::service::{ServiceState, WorkerHandles};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::server::shutdown::shutdown_signal;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the listener and serves `app` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server loop fails.
pub async fn serve(
    app: Router,
    config: &ServerConfig,
    state: ServiceState,
    workers: WorkerHandles,
) -> ServerResult<()> {
    let start_time = Instant::now();
    let server_addr = config.server_addr();

    let listener = TcpListener::bind(server_addr)
        .await
        .map_err(|source| ServerError::Bind {
            address: server_addr,
            source,
        })
        .inspect_err(log_failure)?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let signal_state = state.clone();
    let signal = async move {
        shutdown_signal().await;
        let _ = draining_tx.send(());
        signal_state.sessions.shutdown().await;
    };

    let shutdown_timeout = config.shutdown_timeout();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .into_future();

    let result = tokio::select! {
        result = server => result.map_err(ServerError::Runtime),
        () = drain_deadline(draining_rx, shutdown_timeout) => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping remaining connections"
            );
            Ok(())
        }
    };

    state.shutdown().await;
    if tokio::time::timeout(shutdown_timeout, workers.wait_all())
        .await
        .is_err()
    {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Background workers did not stop in time"
        );
    }

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = start_time.elapsed().as_secs(),
                "Server shut down gracefully"
            );
            Ok(())
        }
        Err(err) => {
            log_failure(&err);
            Err(err)
        }
    }
}

/// Resolves `timeout` after draining starts; never resolves otherwise.
async fn drain_deadline(draining: oneshot::Receiver<()>, timeout: Duration) {
    match draining.await {
        Ok(()) => tokio::time::sleep(timeout).await,
        Err(_) => std::future::pending().await,
    }
}

fn log_failure(err: &ServerError) {
    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %err,
        code = err.error_code(),
        "Server encountered an error"
    );

    if let Some(suggestion) = err.suggestion() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            suggestion = suggestion,
            "Recovery suggestion"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn drain_deadline_waits_for_the_signal() {
        let (tx, rx) = oneshot::channel();
        let deadline = tokio::spawn(drain_deadline(rx, Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!deadline.is_finished());

        tx.send(()).expect("receiver alive");
        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        assert!(deadline.is_finished());
    }
}
