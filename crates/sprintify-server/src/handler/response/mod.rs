//! Response types for HTTP handlers.
//!
//! Successful bodies share the envelope `{ "success": true, "<resource>": ..., "message"?: ... }`.

mod board_columns;
mod epics;
mod errors;
mod health;
mod issues;
mod members;
mod notifications;
mod projects;
mod sprints;
mod statuses;

pub use board_columns::*;
pub use epics::*;
pub use errors::*;
pub use health::*;
pub use issues::*;
pub use members::*;
pub use notifications::*;
pub use projects::*;
pub use sprints::*;
pub use statuses::*;

/// Declares a success envelope carrying a single resource under `$field`.
macro_rules! envelope {
    ($(#[$meta:meta])* $name:ident { $field:ident: $ty:ty }) => {
        $(#[$meta])*
        #[must_use]
        #[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize, ::schemars::JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            /// Always `true`.
            pub success: bool,
            pub $field: $ty,
            /// Optional human readable note.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub message: Option<String>,
        }

        impl $name {
            pub fn new($field: $ty) -> Self {
                Self {
                    success: true,
                    $field,
                    message: None,
                }
            }

            pub fn with_message(mut self, message: impl Into<String>) -> Self {
                self.message = Some(message.into());
                self
            }
        }
    };
}

pub(crate) use envelope;

/// Declares a paginated success envelope carrying `$field: Vec<$item>`.
macro_rules! page_envelope {
    ($(#[$meta:meta])* $name:ident { $field:ident: $item:ty }) => {
        $(#[$meta])*
        #[must_use]
        #[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize, ::schemars::JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            /// Always `true`.
            pub success: bool,
            pub $field: Vec<$item>,
            pub pagination: ::sprintify_postgres::types::PageInfo,
        }

        impl $name {
            pub fn new($field: Vec<$item>, pagination: ::sprintify_postgres::types::PageInfo) -> Self {
                Self {
                    success: true,
                    $field,
                    pagination,
                }
            }
        }
    };
}

pub(crate) use page_envelope;
