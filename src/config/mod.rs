//! Configuration handling for the extraction pipeline.
//!
//! Only the network-facing knobs come from the environment. The selector
//! cascade and the noise denylist are code-level defaults
//! ([`crate::extractor::CascadeConfig`]) injected at construction time.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Environment variable names.
pub const ENV_USER_AGENT: &str = "QUARRY_USER_AGENT";
pub const ENV_ACCEPT_LANGUAGE: &str = "QUARRY_ACCEPT_LANGUAGE";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "QUARRY_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "QUARRY_REQUEST_TIMEOUT_SECS";
pub const ENV_MAX_BODY_BYTES: &str = "QUARRY_MAX_BODY_BYTES";
pub const ENV_CONCURRENCY: &str = "QUARRY_CONCURRENCY";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: u64 = 5 * 1024 * 1024; // 5MB
const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for the HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_body_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    fetch: FetchConfig,
    concurrency: usize,
}

impl Config {
    pub fn new(fetch: FetchConfig, concurrency: usize) -> Self {
        Self { fetch, concurrency }
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let user_agent = env::var(ENV_USER_AGENT).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let accept_language = env::var(ENV_ACCEPT_LANGUAGE)
            .unwrap_or_else(|_| DEFAULT_ACCEPT_LANGUAGE.to_string());
        let connect_timeout_secs: u64 =
            positive_from_env(ENV_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let request_timeout_secs: u64 =
            positive_from_env(ENV_REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let max_body_bytes: u64 = positive_from_env(ENV_MAX_BODY_BYTES, DEFAULT_MAX_BODY_BYTES)?;
        let concurrency: usize = positive_from_env(ENV_CONCURRENCY, DEFAULT_CONCURRENCY)?;

        if user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: ENV_USER_AGENT,
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            fetch: FetchConfig {
                user_agent,
                accept_language,
                connect_timeout: Duration::from_secs(connect_timeout_secs),
                request_timeout: Duration::from_secs(request_timeout_secs),
                max_body_bytes,
            },
            concurrency,
        })
    }

    /// Settings used to build a [`crate::fetcher::Fetcher`].
    pub fn fetch(&self) -> &FetchConfig {
        &self.fetch
    }

    /// Upper bound on concurrent extractions in a batch.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(FetchConfig::default(), DEFAULT_CONCURRENCY)
    }
}

fn positive_from_env<T>(field: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + From<u8>,
    T::Err: Display,
{
    let Ok(raw) = env::var(field) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            field,
            reason: format!("{raw:?}: {e}"),
        })?;
    if value == T::from(0) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// Errors that can occur while building a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
