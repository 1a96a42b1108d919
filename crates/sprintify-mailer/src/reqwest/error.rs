//! Error types for the HTTP relay.

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The relay answered with a non-success status.
    #[error("relay responded with status {0}")]
    Status(u16),
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        use crate::ErrorKind;

        match err {
            Error::Reqwest(e) if e.is_timeout() => {
                crate::Error::from_source(ErrorKind::Timeout, e).with_message("relay timed out")
            }
            Error::Reqwest(e) if e.is_builder() => crate::Error::from_source(ErrorKind::Configuration, e)
                .with_message("invalid relay client configuration"),
            Error::Reqwest(e) => {
                crate::Error::from_source(ErrorKind::NetworkError, e).with_message("relay unreachable")
            }
            Error::Status(status) if status == 429 || status >= 500 => {
                crate::Error::new(ErrorKind::NetworkError)
                    .with_message(format!("relay unavailable ({status})"))
            }
            Error::Status(status) => crate::Error::new(ErrorKind::Rejected)
                .with_message(format!("relay rejected message ({status})")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn status_mapping() {
        let unavailable: crate::Error = Error::Status(503).into();
        assert_eq!(unavailable.kind, ErrorKind::NetworkError);
        assert!(unavailable.is_retryable());

        let throttled: crate::Error = Error::Status(429).into();
        assert!(throttled.is_retryable());

        let rejected: crate::Error = Error::Status(422).into();
        assert_eq!(rejected.kind, ErrorKind::Rejected);
        assert!(!rejected.is_retryable());
    }
}
