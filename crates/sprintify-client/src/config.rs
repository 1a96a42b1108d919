//! Configuration for the API client.

use std::time::Duration;

use url::Url;

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`ApiClient`].
///
/// [`ApiClient`]: crate::ApiClient
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, for example `https://api.sprintify.dev/`.
    pub base_url: Url,
    /// Default timeout for HTTP requests.
    pub timeout: Duration,
    /// User-Agent header to send with requests.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for the given server origin.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: Self::default_user_agent(),
        }
    }

    fn default_user_agent() -> String {
        format!("sprintify-client/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// Returns the effective user agent, using default if empty.
    pub fn effective_user_agent(&self) -> String {
        if self.user_agent.is_empty() {
            Self::default_user_agent()
        } else {
            self.user_agent.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Url::parse("http://localhost:3000/").unwrap())
    }

    #[test]
    fn config_defaults() {
        let config = config();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.user_agent.starts_with("sprintify-client/"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = config()
            .with_timeout(Duration::ZERO)
            .with_user_agent("");
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        assert!(config.effective_user_agent().starts_with("sprintify-client/"));
    }
}
