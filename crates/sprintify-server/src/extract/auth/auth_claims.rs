//! JWT claims carried by access and one-shot tokens.

use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sprintify_core::TokenType;
use uuid::Uuid;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};

/// Claims of a token issued by the identity service.
///
/// | Claim | Field | Description |
/// |-------|-------|-------------|
/// | `iss` | `issued_by` | Token issuer |
/// | `aud` | `audience` | Intended audience |
/// | `jti` | `token_id` | Unique token identifier |
/// | `sub` | `account_id` | Account the token represents |
/// | `email` | `email` | Account email at issue time |
/// | `evf` | `email_verified` | Whether the email was verified |
/// | `typ` | `token_type` | Endpoint class the token is valid for |
/// | `iat` | `issued_at` | Issue time (seconds since epoch) |
/// | `exp` | `expires_at` | Expiry (seconds since epoch) |
///
/// Tokens are signed with EdDSA (Ed25519).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    #[serde(rename = "iss")]
    issued_by: String,
    #[serde(rename = "aud")]
    audience: String,

    /// Unique token identifier.
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Account this token represents.
    #[serde(rename = "sub")]
    pub account_id: Uuid,
    /// Account email address.
    pub email: String,
    /// Whether the email address was verified when the token was issued.
    #[serde(rename = "evf")]
    pub email_verified: bool,
    /// Endpoint class this token is valid for.
    #[serde(rename = "typ")]
    pub token_type: TokenType,

    /// Issue time.
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiry time.
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl AuthClaims {
    /// JWT audience of every Sprintify token.
    pub const JWT_AUDIENCE: &str = "sprintify:server";
    /// JWT issuer of every Sprintify token.
    pub const JWT_ISSUER: &str = "sprintify";

    /// Creates claims valid from now for `lifetime`.
    ///
    /// Timestamps are truncated to whole seconds, the JWT resolution.
    pub fn new(
        account_id: Uuid,
        email: impl Into<String>,
        email_verified: bool,
        token_type: TokenType,
        lifetime: SignedDuration,
    ) -> Self {
        let now = Timestamp::now();
        let issued_at = Timestamp::from_second(now.as_second()).unwrap_or(now);
        let expires_at = issued_at.saturating_add(lifetime).unwrap_or(issued_at);

        Self {
            issued_by: Self::JWT_ISSUER.to_owned(),
            audience: Self::JWT_AUDIENCE.to_owned(),
            token_id: Uuid::now_v7(),
            account_id,
            email: email.into(),
            email_verified,
            token_type,
            issued_at,
            expires_at,
        }
    }

    /// Returns `true` if the expiry time has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns the remaining lifetime, or zero once expired.
    #[must_use]
    pub fn remaining_lifetime(&self) -> SignedDuration {
        let remaining = self.expires_at.duration_since(Timestamp::now());
        if remaining.is_positive() {
            remaining
        } else {
            SignedDuration::ZERO
        }
    }

    /// Verifies the signature and registered claims of `token`.
    pub fn decode(token: &str, decoding_key: &DecodingKey) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_audience(&[Self::JWT_AUDIENCE]);
        validation.set_issuer(&[Self::JWT_ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "jti", "sub", "iat", "exp"]);

        let claims = decode::<Self>(token, decoding_key, &validation)?.claims;

        if claims.is_expired() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_id = %claims.token_id,
                account_id = %claims.account_id,
                expired_at = %claims.expires_at,
                "token rejected: expired"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Your session has expired")
                .with_resource("authentication"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            account_id = %claims.account_id,
            token_type = %claims.token_type,
            remaining = ?claims.remaining_lifetime(),
            "token verified"
        );

        Ok(claims)
    }

    /// Signs the claims into a compact JWT.
    pub fn encode(&self, encoding_key: &EncodingKey) -> Result<String> {
        let header = Header::new(Algorithm::EdDSA);
        encode(&header, self, encoding_key).map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                account_id = %self.account_id,
                "failed to encode token"
            );
            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_context(error.to_string())
        })
    }

    /// Signs the claims into an `Authorization: Bearer` header.
    pub fn into_header(self, encoding_key: &EncodingKey) -> Result<TypedHeader<Authorization<Bearer>>> {
        let token = self.encode(encoding_key)?;
        let bearer = Authorization::bearer(&token).map_err(|_| {
            ErrorKind::InternalServerError
                .with_message("Authentication header creation failed")
                .with_context("generated token is not a valid header value")
        })?;

        Ok(TypedHeader(bearer))
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                ErrorKind::Unauthorized.with_message("Your session has expired")
            }
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Authentication token verification failed"),
            JwtErrorKind::InvalidAudience => ErrorKind::Unauthorized
                .with_message("Authentication token is not valid for this service"),
            JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                .with_message("Authentication token is from an untrusted source"),
            JwtErrorKind::ImmatureSignature => {
                ErrorKind::Unauthorized.with_message("Authentication token is not valid yet")
            }
            JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) | JwtErrorKind::Json(_) => {
                ErrorKind::MalformedAuthToken.with_message("Authentication token is invalid")
            }
            JwtErrorKind::InvalidAlgorithm => ErrorKind::MalformedAuthToken
                .with_message("Authentication token uses an unsupported algorithm"),
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message("Authentication token is incomplete")
                .with_context(format!("missing required claim: {claim}")),
            _ => ErrorKind::InternalServerError
                .with_message("Authentication processing failed")
                .with_context(error.to_string()),
        };

        error.with_resource("authentication")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::SessionKeys;

    fn claims(token_type: TokenType, lifetime: SignedDuration) -> AuthClaims {
        AuthClaims::new(
            Uuid::now_v7(),
            "ada@example.com",
            true,
            token_type,
            lifetime,
        )
    }

    #[test]
    fn round_trips_through_jwt() -> anyhow::Result<()> {
        let keys = SessionKeys::test_keys()?;
        let claims = claims(TokenType::Access, SignedDuration::from_hours(1));

        let token = claims.encode(keys.encoding_key())?;
        let decoded = AuthClaims::decode(&token, keys.decoding_key())?;
        assert_eq!(decoded, claims);
        assert!(decoded.remaining_lifetime().is_positive());
        Ok(())
    }

    #[test]
    fn expired_token_is_unauthorized() -> anyhow::Result<()> {
        let keys = SessionKeys::test_keys()?;
        let claims = claims(TokenType::Access, SignedDuration::from_hours(-2));

        let token = claims.encode(keys.encoding_key())?;
        let error = AuthClaims::decode(&token, keys.decoding_key()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[test]
    fn garbage_is_malformed() -> anyhow::Result<()> {
        let keys = SessionKeys::test_keys()?;
        let error = AuthClaims::decode("not-a-jwt", keys.decoding_key()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
        Ok(())
    }

    #[test]
    fn wire_claim_names() -> anyhow::Result<()> {
        let claims = claims(TokenType::ResetPassword, SignedDuration::from_mins(5));
        let value = serde_json::to_value(&claims)?;

        for key in ["iss", "aud", "jti", "sub", "email", "evf", "typ", "iat", "exp"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["typ"], "RESET_PASSWORD");
        assert!(value["exp"].is_i64());
        Ok(())
    }
}
