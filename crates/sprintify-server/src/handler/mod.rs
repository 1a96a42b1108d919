//! All `aide::axum::`[`ApiRouter`]s with related `axum::`[`Handler`]s.
//!
//! Private routes live under [`API_PREFIX`] and sit behind the authentication
//! middleware. Public routes (health) are mounted at the root.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use sprintify_server::handler::routes;
//! use sprintify_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use sprintify_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let (state, _workers) = ServiceState::new(config).await?;
//! let router = routes(state.clone())
//!     .with_open_api(&OpenApiConfig::default())
//!     .with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter
//! [`Handler`]: axum::handler::Handler

mod board_columns;
mod epics;
mod error;
mod issues;
mod members;
mod monitors;
mod notifications;
mod projects;
mod request;
mod response;
mod sprints;
mod statuses;
mod websocket;

use aide::axum::ApiRouter;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub(crate) use crate::handler::response::ErrorResponse;
use crate::middleware::require_authentication;
use crate::service::ServiceState;

/// Path prefix of every authenticated route.
pub const API_PREFIX: &str = "/api/v1";

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all private routes.
fn private_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(projects::routes())
        .merge(members::routes())
        .merge(epics::routes())
        .merge(sprints::routes())
        .merge(board_columns::routes())
        .merge(statuses::routes())
        .merge(issues::routes())
        .merge(notifications::routes())
        .merge(websocket::routes())
}

/// Returns an [`ApiRouter`] with all public routes.
fn public_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().merge(monitors::routes())
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes(state: ServiceState) -> ApiRouter<ServiceState> {
    let require_authentication = from_fn_with_state(state, require_authentication);

    // Private routes with authentication middleware
    let private_router = private_routes().route_layer(require_authentication);

    ApiRouter::new()
        .nest(API_PREFIX, private_router)
        .merge(public_routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::handler::routes;
    use crate::middleware::{OpenApiConfig, RouterOpenApiExt};
    use crate::service::ServiceState;

    /// Returns a new [`TestServer`] with the default router and a state whose
    /// database is unreachable.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        let state = ServiceState::for_tests();
        let app = routes(state.clone())
            .with_open_api(&OpenApiConfig::default())
            .with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server()?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_falls_back_to_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/nowhere/at/all").await;
        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn private_routes_require_a_token() -> anyhow::Result<()> {
        let server = create_test_server()?;

        server
            .get("/api/v1/projects")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v1/ws")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v1/notifications/unread-count")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_unreachable_database() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = response.json();
        assert_eq!(body["isHealthy"], Value::Bool(false));
        assert_eq!(body["contractVersion"], Value::from(1));
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_lists_project_routes() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();

        let body: Value = response.json();
        let paths = body["paths"].as_object().expect("paths object");
        assert!(paths.contains_key("/api/v1/projects"));
        assert!(paths.contains_key("/api/v1/{projectId}/issues"));
        assert!(paths.contains_key("/health"));
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_describes_error_envelope() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let body: Value = server.get("/api/openapi.json").await.json();

        let responses = &body["paths"]["/api/v1/{projectId}/sprints/{sprintId}"]["delete"]["responses"];
        assert!(responses.get("default").is_some());
        assert!(responses.get("403").is_some());
        Ok(())
    }
}
