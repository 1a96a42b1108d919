//! Structured error handling for email delivery.

use std::borrow::Cow;

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the mailer [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of email delivery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The message itself is invalid.
    InvalidInput,
    /// The relay could not be reached.
    NetworkError,
    /// Delivery did not finish in time.
    Timeout,
    /// The relay answered but refused the message.
    Rejected,
    /// The message could not be encoded.
    Serialization,
    /// The provider is misconfigured.
    Configuration,
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Returns whether a later attempt could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Email delivery error with a kind and optional message and source.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: Option<Cow<'static, str>>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns whether a later attempt could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::from_source(ErrorKind::Serialization, error).with_message("failed to encode message")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn builder_and_display() {
        let error = Error::new(ErrorKind::Rejected).with_message("mailbox unavailable");
        assert_eq!(error.kind, ErrorKind::Rejected);
        assert_eq!(error.to_string(), "[rejected]: mailbox unavailable");
        assert_eq!(Error::new(ErrorKind::Timeout).to_string(), "[timeout]");
    }

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::NetworkError.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::Rejected.is_retryable());
        assert!(!ErrorKind::InvalidInput.is_retryable());
    }

    #[test]
    fn kind_names() {
        assert_eq!(ErrorKind::from_str("network_error").ok(), Some(ErrorKind::NetworkError));
        assert!(ErrorKind::from_str("nope").is_err());
        assert_eq!(ErrorKind::default(), ErrorKind::Unknown);
    }
}
