//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is exposed as an extension trait on [`Router`] so the binary
//! can stack them in one expression:
//!
//! ```rust,no_run
//! use axum::Router;
//! use sprintify_server::middleware::{
//!     RecoveryConfig, RouterContractExt, RouterObservabilityExt, RouterRecoveryExt,
//!     RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_contract_check()
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```
//!
//! [`Router`]: axum::Router

mod authentication;
mod contract;
mod observability;
mod recovery;
mod security;
mod specification;

pub use authentication::require_authentication;
pub use contract::{RouterContractExt, check_contract_version};
pub use observability::{RouteCategory, RouterObservabilityExt, track_categorized_metrics};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, DEFAULT_MAX_BODY_SIZE, FrameOptions, ReferrerPolicy, RouterSecurityExt,
    SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
