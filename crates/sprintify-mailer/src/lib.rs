#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod log;
mod message;
mod service;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use config::MailerConfig;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use log::LogMailer;
pub use message::{EmailMessage, EmailReceipt};
pub use service::{EmailProvider, EmailService};

/// Tracing target for mailer operations.
pub const TRACING_TARGET: &str = "sprintify_mailer";
