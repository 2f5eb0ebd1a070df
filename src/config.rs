//! Runtime configuration
//!
//! Read from environment variables.

use std::time::Duration;

use crate::api::memory::DEFAULT_PAGE_SIZE;

/// Base URL of the transactions API; unset means the in-memory demo backend
pub const ENV_API_URL: &str = "TXNVIEW_API_URL";
/// Per-request timeout in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "TXNVIEW_REQUEST_TIMEOUT_SECS";
/// Optional cache entry lifetime in seconds
pub const ENV_CACHE_TTL: &str = "TXNVIEW_CACHE_TTL_SECS";
/// Page size of the demo backend
pub const ENV_PAGE_SIZE: &str = "TXNVIEW_PAGE_SIZE";

/// Default HTTP request timeout
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} (expected a positive integer)")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout: Duration,
    /// `None` keeps cache entries until they are invalidated
    pub cache_ttl: Option<Duration>,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_ttl: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_url = lookup(ENV_API_URL).filter(|url| !url.trim().is_empty());

        let request_timeout = match lookup(ENV_REQUEST_TIMEOUT) {
            Some(value) => Duration::from_secs(parse_positive(ENV_REQUEST_TIMEOUT, &value)?),
            None => defaults.request_timeout,
        };
        let cache_ttl = match lookup(ENV_CACHE_TTL) {
            Some(value) => Some(Duration::from_secs(parse_positive(ENV_CACHE_TTL, &value)?)),
            None => None,
        };
        let page_size = match lookup(ENV_PAGE_SIZE) {
            Some(value) => parse_positive(ENV_PAGE_SIZE, &value)? as usize,
            None => defaults.page_size,
        };

        Ok(Self {
            api_url,
            request_timeout,
            cache_ttl,
            page_size,
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 5);
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_URL, "http://localhost:3000"),
            (ENV_REQUEST_TIMEOUT, "5"),
            (ENV_CACHE_TTL, "120"),
            (ENV_PAGE_SIZE, "10"),
        ]))
        .unwrap();

        assert_eq!(config.api_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(120)));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(Config::from_lookup(lookup(&[(ENV_PAGE_SIZE, "0")])).is_err());
        let err = Config::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_REQUEST_TIMEOUT));
    }

    #[test]
    fn test_blank_url_means_demo_backend() {
        let config = Config::from_lookup(lookup(&[(ENV_API_URL, "  ")])).unwrap();
        assert!(config.api_url.is_none());
    }
}
