//! Database connection extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut};
use sprintify_postgres::{PgClient, PgConn, PgError};

use crate::handler::{Error, ErrorKind};

/// Checks a [`PgConn`] out of the pool for the duration of the request.
///
/// ```rust,ignore
/// async fn list_epics(PgPool(mut conn): PgPool) {
///     let epics = conn.list_project_epics(project_id).await?;
/// }
/// ```
#[derive(Debug, Deref, DerefMut)]
pub struct PgPool(pub PgConn);

impl<S> FromRequestParts<S> for PgPool
where
    PgClient: FromRef<S>,
    S: Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pg_client = PgClient::from_ref(state);
        let conn = pg_client.get_connection().await.map_err(|error| {
            tracing::error!(error = %error, "failed to acquire database connection");
            let kind = match error {
                PgError::Timeout(_) => ErrorKind::ServiceUnavailable,
                _ => ErrorKind::InternalServerError,
            };
            kind.with_message("Database connection unavailable")
                .with_context(error.to_string())
        })?;

        Ok(PgPool(conn))
    }
}

impl aide::OperationInput for PgPool {}
