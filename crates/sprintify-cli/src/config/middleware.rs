//! Middleware configuration for the HTTP server.
//!
//! CORS preflight settings and the OpenAPI document paths. The request
//! timeout and allowed origins live in [`ServerConfig`] and are merged in by
//! [`MiddlewareConfig::cors_for`] and [`MiddlewareConfig::recovery_for`].
//!
//! [`ServerConfig`]: super::ServerConfig

use clap::Args;
use serde::{Deserialize, Serialize};
use sprintify_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};

use super::ServerConfig;
use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining CORS and OpenAPI settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// OpenAPI documentation configuration.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,
}

impl MiddlewareConfig {
    /// Returns the CORS configuration with the server's allowed origins.
    pub fn cors_for(&self, server: &ServerConfig) -> CorsConfig {
        self.cors
            .clone()
            .with_origins(server.cors_allowed_origins.clone())
    }

    /// Returns the recovery configuration with the server's request timeout.
    pub fn recovery_for(&self, server: &ServerConfig) -> RecoveryConfig {
        RecoveryConfig::with_timeout_secs(server.request_timeout)
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_age_secs = self.cors.max_age_seconds,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            "OpenAPI configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_settings_flow_into_layers() {
        let middleware = MiddlewareConfig {
            cors: CorsConfig::default(),
            openapi: OpenApiConfig::default(),
        };
        let server = ServerConfig {
            request_timeout: 45,
            cors_allowed_origins: vec!["https://app.sprintify.dev".to_owned()],
            ..ServerConfig::default()
        };

        let cors = middleware.cors_for(&server);
        assert_eq!(cors.allowed_origins, server.cors_allowed_origins);
        assert_eq!(middleware.recovery_for(&server).request_timeout, 45);
    }
}
