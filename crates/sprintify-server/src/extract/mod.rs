//! Request extractors with consistent error responses.
//!
//! - [`AuthHeader`], [`AuthClaims`] and [`AuthState`] verify the caller's token.
//! - [`AuthProvider`] runs the project authorization gate.
//! - [`Json`], [`ValidateJson`], [`Path`] and [`Query`] replace their axum
//!   counterparts and reject with the standard error envelope.
//! - [`PgPool`] checks a connection out of the pool.

pub mod auth;
mod pg_pool;
pub mod reject;

pub use crate::extract::auth::{AuthClaims, AuthHeader, AuthProvider, AuthState};
pub use crate::extract::pg_pool::PgPool;
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};
pub use crate::{TRACING_TARGET_AUTHENTICATION, TRACING_TARGET_AUTHORIZATION};
