//! Bearer token extraction.

use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::header::UPGRADE;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use serde::Deserialize;

use super::AuthClaims;
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

/// Verified token claims together with the keys that checked them.
///
/// Only the signature and registered claims are verified here; use
/// [`AuthState`] for the checks that need the database.
///
/// The token is read from `Authorization: Bearer`. WebSocket upgrade requests,
/// which browsers cannot attach headers to, may pass it as `?token=` instead.
///
/// [`AuthState`]: crate::extract::AuthState
#[must_use]
#[derive(Debug, Clone)]
pub struct AuthHeader {
    auth_claims: AuthClaims,
    session_keys: SessionKeys,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl AuthHeader {
    /// Creates a header from already verified claims.
    #[inline]
    pub const fn new(auth_claims: AuthClaims, session_keys: SessionKeys) -> Self {
        Self {
            auth_claims,
            session_keys,
        }
    }

    /// Returns the verified claims.
    #[inline]
    pub const fn as_auth_claims(&self) -> &AuthClaims {
        &self.auth_claims
    }

    /// Consumes the header and returns the verified claims.
    #[inline]
    pub fn into_auth_claims(self) -> AuthClaims {
        self.auth_claims
    }

    /// Verifies a raw token string.
    pub fn from_token(token: &str, session_keys: SessionKeys) -> Result<Self> {
        let auth_claims = AuthClaims::decode(token, session_keys.decoding_key())?;
        Ok(Self::new(auth_claims, session_keys))
    }

    /// Re-signs the claims into an `Authorization` header.
    pub fn into_header(self) -> Result<TypedHeader<Authorization<Bearer>>> {
        self.auth_claims
            .into_header(self.session_keys.encoding_key())
    }
}

fn is_websocket_upgrade(parts: &Parts) -> bool {
    parts
        .headers
        .get(UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

fn query_token(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

fn missing_token() -> Error<'static> {
    ErrorKind::MissingAuthToken
        .with_message("Authentication required")
        .with_context("missing Authorization header with Bearer token")
        .with_resource("authentication")
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Sync + Send,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let session_keys = SessionKeys::from_ref(state);

        let auth_header = match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(bearer)) => Self::from_token(bearer.token(), session_keys)?,
            Err(rejection) => match rejection.reason() {
                TypedHeaderRejectionReason::Missing if is_websocket_upgrade(parts) => {
                    let token = query_token(parts).ok_or_else(missing_token)?;
                    tracing::trace!(
                        target: TRACING_TARGET_AUTHENTICATION,
                        "using query token for websocket upgrade"
                    );
                    Self::from_token(&token, session_keys)?
                }
                TypedHeaderRejectionReason::Missing => return Err(missing_token()),
                TypedHeaderRejectionReason::Error(_) => {
                    return Err(ErrorKind::MalformedAuthToken
                        .with_message("Invalid token format")
                        .with_context("Authorization header must contain a Bearer token")
                        .with_resource("authentication"));
                }
                _ => {
                    return Err(ErrorKind::InternalServerError
                        .with_message("Authentication processing failed")
                        .with_resource("authentication"));
                }
            },
        };

        parts.extensions.insert(auth_header.clone());
        Ok(auth_header)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(uri: &str, upgrade: bool) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if upgrade {
            builder = builder.header(UPGRADE, "websocket");
        }
        builder.body(()).map(|request| request.into_parts().0).unwrap()
    }

    #[test]
    fn query_token_only_read_when_present() {
        assert_eq!(
            query_token(&parts("/api/v1/ws?token=abc", true)).as_deref(),
            Some("abc")
        );
        assert_eq!(query_token(&parts("/api/v1/ws?token=", true)), None);
        assert_eq!(query_token(&parts("/api/v1/ws", true)), None);
    }

    #[test]
    fn upgrade_detection() {
        assert!(is_websocket_upgrade(&parts("/api/v1/ws", true)));
        assert!(!is_websocket_upgrade(&parts("/api/v1/ws", false)));
    }
}
