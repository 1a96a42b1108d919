//! Startup errors.
//!
//! Raised while assembling [`ServiceState`]: reading configuration, loading
//! the token keys and connecting to Postgres or the mail relay. Request
//! failures use [`handler::Error`].
//!
//! [`ServiceState`]: crate::service::ServiceState
//! [`handler::Error`]: crate::handler::Error

use std::borrow::Cow;
use std::error::Error as StdError;

/// Result type for service wiring.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The startup dependency that could not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    /// A setting is missing or inconsistent.
    #[strum(to_string = "invalid configuration")]
    Config,
    /// The pool could not be built or migrations failed.
    #[strum(to_string = "database unavailable")]
    Database,
    /// The email provider could not be created.
    #[strum(to_string = "mailer unavailable")]
    Mailer,
    /// A token key file is unreadable or not an Ed25519 PEM.
    #[strum(to_string = "session keys unusable")]
    SessionKeys,
}

/// A startup failure and the error that caused it.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn database(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    pub fn mailer(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Mailer, message)
    }

    pub fn session_keys(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::SessionKeys, message)
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failed_dependency() {
        let error = Error::database("failed to apply migrations");
        assert_eq!(error.to_string(), "database unavailable: failed to apply migrations");
        assert_eq!(error.kind(), ErrorKind::Database);
    }

    #[test]
    fn key_file_failures_keep_their_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = Error::session_keys("failed to read public.pem").with_source(cause);

        assert_eq!(error.kind(), ErrorKind::SessionKeys);
        assert_eq!(error.message(), "failed to read public.pem");
        assert!(StdError::source(&error).is_some_and(|s| s.to_string() == "no such file"));
    }
}
