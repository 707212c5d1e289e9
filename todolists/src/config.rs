//! Backend configuration read from the environment

use crate::error::ConfigError;
use std::time::Duration;

/// Base URL used when `TODOLISTS_API_URL` is not set
pub const DEFAULT_API_URL: &str = "https://social-network.samuraijs.com/api/1.1/";

/// Default per-request HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default time an awaited operation may take in seconds
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the todolists backend
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, ending with `/`
    pub base_url: String,
    /// Value of the `API-KEY` header
    pub api_key: Option<String>,
    /// Timeout of a single HTTP request
    pub request_timeout: Duration,
    /// How long an awaited client operation waits for its outcome
    pub operation_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Reads the configuration from `TODOLISTS_*` environment variables
    ///
    /// Unset variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a timeout is not a positive
    /// integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("TODOLISTS_API_URL")
            .filter(|url| !url.trim().is_empty())
            .map_or(defaults.base_url, |url| with_trailing_slash(url.trim()));
        let api_key = lookup("TODOLISTS_API_KEY").filter(|key| !key.trim().is_empty());
        let request_timeout = seconds(
            "TODOLISTS_REQUEST_TIMEOUT_SECS",
            lookup("TODOLISTS_REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout,
        )?;
        let operation_timeout = seconds(
            "TODOLISTS_OPERATION_TIMEOUT_SECS",
            lookup("TODOLISTS_OPERATION_TIMEOUT_SECS"),
            defaults.operation_timeout,
        )?;

        Ok(Self {
            base_url,
            api_key,
            request_timeout,
            operation_timeout,
        })
    }

    /// Sets the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = with_trailing_slash(base_url.as_ref());
        self
    }

    /// Sets the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the operation timeout
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets the HTTP request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn seconds(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
