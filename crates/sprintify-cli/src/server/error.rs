//! Server error types with recovery suggestions.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors raised while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The server loop failed while accepting or serving connections.
    #[error("runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Returns a short, stable code for this error type.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "E001",
            Self::Runtime(_) => "E002",
        }
    }

    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        let source = match self {
            Self::Bind { source, .. } | Self::Runtime(source) => source,
        };

        match source.kind() {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => Some(
                "The port is already in use. Try a different port or stop the conflicting service",
            ),
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    #[test]
    fn bind_errors_carry_a_suggestion() {
        let error = ServerError::Bind {
            address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };

        assert_eq!(error.error_code(), "E001");
        assert!(error.suggestion().is_some_and(|s| s.contains("already in use")));
        assert!(error.to_string().contains("127.0.0.1:3000"));
    }

    #[test]
    fn unknown_failures_have_no_suggestion() {
        let error = ServerError::Runtime(io::Error::other("boom"));
        assert_eq!(error.error_code(), "E002");
        assert!(error.suggestion().is_none());
    }
}
