// Client configuration
// Defaults point at a locally running travel agency backend

use crate::models::CustomerId;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub const ENV_BASE_URL: &str = "TRAVEL_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "TRAVEL_API_TIMEOUT_MS";
pub const ENV_DEFAULT_CUSTOMER: &str = "TRAVEL_DEFAULT_CUSTOMER_ID";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub default_customer_id: CustomerId,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_ms: 10_000,
            default_customer_id: 1,
            user_agent: concat!("travel-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds a config from the defaults overridden by `TRAVEL_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = raw.trim().parse().map_err(|_| {
                ClientError::ConfigError(format!("{ENV_TIMEOUT_MS} is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_CUSTOMER) {
            config.default_customer_id = raw.trim().parse().map_err(|_| {
                ClientError::ConfigError(format!("{ENV_DEFAULT_CUSTOMER} is not an id: {raw}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ClientError::ConfigError("base_url is empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "base_url must be http(s): {base_url}"
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Joins an endpoint path onto the base url without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
