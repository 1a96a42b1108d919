#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod api;
mod config;
mod error;

pub mod realtime;
pub mod sync;

pub use crate::api::{
    AllRead, ApiClient, Issue, IssueFilter, IssuePatch, IssuesPage, NotificationDeleted,
    NotificationFilter, NotificationRead, NotificationsPage, PageInfo, TRACING_TARGET,
};
pub use crate::config::{ClientConfig, DEFAULT_TIMEOUT};
pub use crate::error::{Error, Result};
