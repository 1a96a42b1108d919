//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned by the REST client and the realtime transport.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with an error envelope.
    #[error("{status}: {message}")]
    Api {
        status: StatusCode,
        /// Machine-readable error name, for example `forbidden`.
        name: String,
        /// User-facing message.
        message: String,
        /// Field-level messages of a validation failure.
        errors: Vec<String>,
    },

    /// A payload or socket frame could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The base URL could not be joined with a route path.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The socket transport failed.
    #[cfg(feature = "socket")]
    #[error("socket error: {0}")]
    Socket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// Every reconnect attempt was used up.
    #[error("realtime connection lost after {attempts} reconnect attempts")]
    ReconnectExhausted { attempts: u32 },
}

impl Error {
    /// Returns the HTTP status of an API error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    /// Returns whether the credential was missing, invalid or expired.
    ///
    /// Realtime features should be disabled (and polling kept) on this error
    /// instead of retried.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Returns whether the caller lacks the role required by the operation.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    /// Returns whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Reqwest(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => status.is_server_error(),
            #[cfg(feature = "socket")]
            Self::Socket(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: StatusCode) -> Error {
        Error::Api {
            status,
            name: "x".into(),
            message: "x".into(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn classifies_api_errors() {
        assert!(api(StatusCode::UNAUTHORIZED).is_unauthorized());
        assert!(api(StatusCode::FORBIDDEN).is_forbidden());
        assert!(api(StatusCode::SERVICE_UNAVAILABLE).is_transient());
        assert!(!api(StatusCode::CONFLICT).is_transient());
        assert_eq!(
            api(StatusCode::NOT_FOUND).to_string(),
            "404 Not Found: x"
        );
    }
}
