//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod pg_account;
mod pg_board;
mod pg_error;
mod pg_notification;
mod pg_project;

pub use http_error::{Error, ErrorKind, Result};
