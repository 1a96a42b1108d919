//! HTTP relay provider built on `reqwest`.
//!
//! ```rust,ignore
//! use sprintify_mailer::MailerConfig;
//!
//! let config = MailerConfig::default().with_relay_url("https://relay.example.com/send".parse()?);
//! let service = config.into_service()?;
//! ```

mod client;
mod error;

pub use client::RelayMailer;
pub use error::{Error, Result};

/// Tracing target for relay operations.
pub const TRACING_TARGET: &str = "sprintify_mailer::reqwest";
