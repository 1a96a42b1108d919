//! Mailer configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{EmailService, LogMailer, Result, TRACING_TARGET};

/// Default relay request timeout: 10 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default sender address.
pub const DEFAULT_FROM: &str = "Sprintify <no-reply@sprintify.dev>";

/// Configuration selecting and tuning the email provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MailerConfig {
    /// HTTP relay endpoint; when unset emails are only logged
    #[cfg_attr(
        feature = "config",
        arg(long = "mailer-relay-url", env = "MAILER_RELAY_URL")
    )]
    #[serde(default)]
    pub mailer_relay_url: Option<Url>,

    /// Bearer token sent to the relay
    #[cfg_attr(
        feature = "config",
        arg(long = "mailer-relay-token", env = "MAILER_RELAY_TOKEN", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub mailer_relay_token: Option<String>,

    /// Relay request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "mailer-timeout", env = "MAILER_TIMEOUT", default_value = "10")
    )]
    #[serde(default = "default_timeout_secs")]
    pub mailer_timeout: u64,

    /// Sender address placed on every email
    #[cfg_attr(
        feature = "config",
        arg(
            long = "mailer-from",
            env = "MAILER_FROM",
            default_value = "Sprintify <no-reply@sprintify.dev>"
        )
    )]
    #[serde(default = "default_from")]
    pub mailer_from: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_from() -> String {
    DEFAULT_FROM.to_owned()
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            mailer_relay_url: None,
            mailer_relay_token: None,
            mailer_timeout: default_timeout_secs(),
            mailer_from: default_from(),
        }
    }
}

impl MailerConfig {
    /// Returns the relay timeout, using the default when zero.
    pub fn timeout(&self) -> Duration {
        match self.mailer_timeout {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Sets the relay endpoint.
    #[must_use]
    pub fn with_relay_url(mut self, url: Url) -> Self {
        self.mailer_relay_url = Some(url);
        self
    }

    /// Builds the configured provider.
    ///
    /// Without a relay URL, or when the `reqwest` feature is disabled, the
    /// service falls back to [`LogMailer`].
    pub fn into_service(self) -> Result<EmailService> {
        match self.mailer_relay_url.clone() {
            #[cfg(feature = "reqwest")]
            Some(url) => {
                let client = crate::reqwest::RelayMailer::new(url, self)?;
                Ok(client.into_service())
            }
            #[cfg(not(feature = "reqwest"))]
            Some(url) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    relay_url = %url,
                    "Relay configured but HTTP support is not compiled in, logging emails instead"
                );
                Ok(EmailService::new(LogMailer))
            }
            None => {
                tracing::info!(
                    target: TRACING_TARGET,
                    "No mail relay configured, logging emails instead"
                );
                Ok(EmailService::new(LogMailer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MailerConfig::default();
        assert!(config.mailer_relay_url.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.mailer_from, DEFAULT_FROM);
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = MailerConfig {
            mailer_timeout: 0,
            ..MailerConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn falls_back_to_log_provider() {
        let service = MailerConfig::default().into_service().ok();
        assert_eq!(service.map(|s| s.provider_name()), Some("log"));
    }
}
