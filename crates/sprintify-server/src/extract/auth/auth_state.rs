//! Authenticated request state.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use sprintify_postgres::PgClient;
use sprintify_postgres::query::AccountRepository;

use super::{AuthClaims, AuthHeader};
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Claims of a verified access token whose account still exists.
///
/// Extraction fails with:
/// - `401` when the token is missing, malformed, expired or its account is gone,
/// - `403` when the token is not an [`Access`] token.
///
/// The verified state is cached in the request extensions, so extracting it
/// again (for example in a handler behind [`require_authentication`]) costs
/// nothing.
///
/// [`Access`]: sprintify_core::TokenType::Access
/// [`require_authentication`]: crate::middleware::require_authentication
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Verifies the token type and that the account is still provisioned.
    pub async fn from_unverified_header(
        auth_header: AuthHeader,
        pg_client: PgClient,
    ) -> Result<Self> {
        let auth_claims = auth_header.into_auth_claims();

        if !auth_claims.token_type.is_access() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %auth_claims.account_id,
                token_type = %auth_claims.token_type,
                "token rejected: not an access token"
            );
            return Err(ErrorKind::Forbidden
                .with_message("invalid token type")
                .with_resource("authentication"));
        }

        let mut conn = pg_client.get_connection().await.map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                account_id = %auth_claims.account_id,
                "database unavailable during authentication"
            );
            ErrorKind::ServiceUnavailable
                .with_message("Authentication is temporarily unavailable")
                .with_context(error.to_string())
        })?;

        let account = conn.find_account_by_id(auth_claims.account_id).await?;
        if account.is_none() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %auth_claims.account_id,
                token_id = %auth_claims.token_id,
                "token rejected: account no longer exists"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Account not found")
                .with_resource("authentication"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            account_id = %auth_claims.account_id,
            token_id = %auth_claims.token_id,
            "request authenticated"
        );

        Ok(Self(auth_claims))
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    PgClient: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let pg_client = PgClient::from_ref(state);
        let auth_state = Self::from_unverified_header(auth_header, pg_client).await?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthState
where
    S: Sync + Send,
    PgClient: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(auth_state) => Ok(Some(auth_state)),
            Err(error) if error.kind() == ErrorKind::ServiceUnavailable => Err(error),
            Err(_) => Ok(None),
        }
    }
}

impl aide::OperationInput for AuthState {}
