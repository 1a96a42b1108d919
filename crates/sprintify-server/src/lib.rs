#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{Error, ErrorKind, Result};

// Tracing target constants for consistent logging.

/// Tracing target for token verification and extraction.
pub const TRACING_TARGET_AUTHENTICATION: &str = "sprintify_server::authentication";

/// Tracing target for permission checks.
pub const TRACING_TARGET_AUTHORIZATION: &str = "sprintify_server::authorization";
