#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use sprintify_server::handler::routes;
use sprintify_server::middleware::{
    RouterContractExt, RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt,
    RouterSecurityExt, SecurityHeadersConfig,
};
use sprintify_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig, ServerConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "sprintify_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "sprintify_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "sprintify_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting sprintify server"
    );

    cli.log();
    cli.validate()?;

    let (state, workers) = ServiceState::new(cli.service.clone())
        .await
        .context("failed to create service state")?;
    let router = create_router(state.clone(), &cli.server, &cli.middleware);

    server::serve(router, &cli.server, state, workers).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs, tracing spans and timings
/// 3. Contract - warns on client version mismatch
/// 4. Security - CORS, security headers, body limit
/// 5. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, server: &ServerConfig, middleware: &MiddlewareConfig) -> Router {
    let api_routes: Router = routes(state.clone())
        .with_open_api(&middleware.openapi)
        .with_state(state);

    api_routes
        .with_security(&middleware.cors_for(server), &SecurityHeadersConfig::default())
        .with_contract_check()
        .with_metrics()
        .with_observability()
        .with_recovery(&middleware.recovery_for(server))
}
