//! Health monitoring handler.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use sprintify_core::CONTRACT_VERSION;
use sprintify_postgres::PgClient;

use crate::extract::Json;
use crate::handler::response::Health;
use crate::service::{ServiceState, SessionRegistry};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "sprintify_server::handler::monitors";

/// Reports database and realtime status.
///
/// Responds with `503` when the pool cannot hand out a connection.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(pg_client): State<PgClient>,
    State(sessions): State<SessionRegistry>,
) -> (StatusCode, Json<Health>) {
    let is_healthy = match pg_client.get_connection().await {
        Ok(_) => true,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "database connection unavailable"
            );
            false
        }
    };

    let pool = pg_client.pool_status();
    let health = Health {
        is_healthy,
        pool_size: pool.size,
        pool_available: pool.available,
        online_accounts: sessions.online_count().await,
        connections: sessions.connection_count().await,
        contract_version: CONTRACT_VERSION,
    };

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        is_healthy,
        connections = health.connections,
        "health status prepared"
    );

    (status_code, Json(health))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get service health")
        .response::<200, Json<Health>>()
        .response_with::<503, Json<Health>, _>(|res| res.description("Database unavailable."))
}

/// Returns the public health route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Health"))
}
