use std::time::Duration;

use thiserror::Error;

use crate::cache::QUOTE_TTL;
use crate::transport::RetryPolicy;

/// Fixed upstream host for historical market data.
pub const DEFAULT_BASE_URL: &str = "https://hist.databento.com/v0";

/// Required prefix on provider API keys.
pub const API_KEY_PREFIX: &str = "db-";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TICKLINE_API_KEY";

const DEFAULT_USER_AGENT: &str = "tickline/0.1.0";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Credential and configuration errors, raised synchronously at construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key is empty")]
    EmptyKey,
    #[error("api key must start with '{API_KEY_PREFIX}'")]
    BadKeyPrefix,
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

/// Engine configuration with validated credential.
///
/// Construction fails before any network call if the key is empty or does
/// not carry the provider prefix.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    api_key: String,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub quote_ttl: Duration,
}

impl EngineConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        if !api_key.starts_with(API_KEY_PREFIX) {
            return Err(ConfigError::BadKeyPrefix);
        }

        Ok(Self {
            api_key,
            base_url: String::from(DEFAULT_BASE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            quote_ttl: QUOTE_TTL,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv(API_KEY_ENV))?;
        Self::new(api_key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
        self.quote_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_key() {
        let config = EngineConfig::new("db-test-key").expect("config should build");
        assert_eq!(config.api_key(), "db-test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_empty_key() {
        let err = EngineConfig::new("").expect_err("must fail");
        assert_eq!(err, ConfigError::EmptyKey);
    }

    #[test]
    fn rejects_unprefixed_key() {
        let err = EngineConfig::new("test-key").expect_err("must fail");
        assert_eq!(err, ConfigError::BadKeyPrefix);
    }
}
