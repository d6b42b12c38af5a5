//! Client configuration.
//!
//! Deserializable from any serde format (TOML in practice) with defaults for
//! everything but the endpoint and the token, or read from `WD_*`
//! environment variables.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Connection settings for a Web Distribution instance.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the instance, e.g. `https://acme.webdistribution.example`.
    pub base_url: String,

    /// Personal access token sent as a bearer token.
    pub api_token: String,

    /// Overall per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_token: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_token: api_token.to_string(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }

    /// Read `WD_BASE_URL`, `WD_API_TOKEN` and optionally `WD_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` when a required variable is missing or the
    /// timeout is not a number. The result is not validated.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| ApiError::Config(format!("{name} is not set")))
        };
        let mut config = Self::new(&var("WD_BASE_URL")?, &var("WD_API_TOKEN")?);
        if let Ok(raw) = std::env::var("WD_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("WD_TIMEOUT_SECS is not a number: {raw}")))?;
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is not http(s), the token
    /// is blank, or the timeout is outside 1..=300 seconds.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ApiError::Config(format!(
                "base_url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.api_token.trim().is_empty() {
            return Err(ApiError::Config("api_token must not be empty".to_string()));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ApiError::Config(
                "timeout_secs must be between 1 and 300".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"*****")
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("webdist-core/", env!("CARGO_PKG_VERSION")).to_string()
}
