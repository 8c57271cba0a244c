//! Client configuration.
//!
//! Base URLs, credentials and transport settings are passed explicitly to
//! the client constructors. [`ClientConfig::from_env`] reads them from the
//! environment for test runs.

use crate::client::DEFAULT_TIMEOUT;
use crate::error::{ClientError, Result};
use std::env;
use std::time::Duration;

/// Default deployments API version segment.
pub const DEFAULT_API_VERSION: &str = "0.0.1";

/// Inventory API version segment.
pub const INVENTORY_API_VERSION: &str = "0.1.0";

/// Environment keys read by [`ClientConfig::from_env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEnv {
    /// Full deployments API base URL.
    Url,
    /// Deployments host (`host[:port]`), used when the URL is unset.
    Host,
    /// Deployments API version segment.
    ApiVersion,
    /// Full inventory API base URL.
    InventoryUrl,
    /// Inventory host, used when the inventory URL is unset.
    InventoryHost,
    /// Management bearer token.
    Token,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Disable TLS certificate verification (`true`/`false` or `1`/`0`).
    Insecure,
}

impl ConfigEnv {
    /// Returns the environment variable name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Url => "DEPLOYMENTS_URL",
            Self::Host => "DEPLOYMENTS_HOST",
            Self::ApiVersion => "DEPLOYMENTS_API_VERSION",
            Self::InventoryUrl => "INVENTORY_URL",
            Self::InventoryHost => "INVENTORY_HOST",
            Self::Token => "DEPLOYMENTS_TOKEN",
            Self::TimeoutSeconds => "DEPLOYMENTS_TIMEOUT_SECS",
            Self::Insecure => "DEPLOYMENTS_INSECURE",
        }
    }
}

/// Configuration shared by all resource clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deployments API base URL, e.g. `http://localhost:8080/api/0.0.1`.
    pub deployments_url: String,
    /// Inventory API base URL.
    pub inventory_url: Option<String>,
    /// Management bearer token.
    pub management_token: Option<String>,
    /// Timeout applied to each request.
    pub timeout: Duration,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    /// Configuration for a deployments API base URL with default settings.
    pub fn new(deployments_url: impl Into<String>) -> Self {
        Self {
            deployments_url: deployments_url.into(),
            inventory_url: None,
            management_token: None,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    /// Configuration for a deployments host, using `http://{host}/api/{version}`.
    pub fn for_host(host: &str, api_version: &str) -> Self {
        Self::new(api_url(host, api_version))
    }

    /// Set the inventory API base URL.
    #[must_use]
    pub fn with_inventory_url(mut self, url: impl Into<String>) -> Self {
        self.inventory_url = Some(url.into());
        self
    }

    /// Set the inventory host, using `http://{host}/api/0.1.0`.
    #[must_use]
    pub fn with_inventory_host(self, host: &str) -> Self {
        self.with_inventory_url(api_url(host, INVENTORY_API_VERSION))
    }

    /// Set the management token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.management_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates.
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when a value is empty, not valid
    /// UTF-8, or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, env::VarError>,
    {
        let read = |key: ConfigEnv| read_nonempty(&lookup, key);

        let deployments_url = match read(ConfigEnv::Url)? {
            Some(url) => url,
            None => {
                let host = read(ConfigEnv::Host)?.unwrap_or_else(|| "localhost".to_string());
                let version = read(ConfigEnv::ApiVersion)?
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
                api_url(&host, &version)
            }
        };

        let inventory_url = match read(ConfigEnv::InventoryUrl)? {
            Some(url) => Some(url),
            None => read(ConfigEnv::InventoryHost)?
                .map(|host| api_url(&host, INVENTORY_API_VERSION)),
        };

        let timeout = match read(ConfigEnv::TimeoutSeconds)? {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_TIMEOUT,
        };

        let accept_invalid_certs = match read(ConfigEnv::Insecure)? {
            Some(value) => parse_bool(ConfigEnv::Insecure, &value)?,
            None => false,
        };

        Ok(Self {
            deployments_url,
            inventory_url,
            management_token: read(ConfigEnv::Token)?,
            timeout,
            accept_invalid_certs,
        })
    }
}

/// Build an API base URL from a host and version segment.
pub fn api_url(host: &str, version: &str) -> String {
    format!("http://{}/api/{}", host.trim_end_matches('/'), version)
}

fn read_nonempty<F>(lookup: &F, key: ConfigEnv) -> Result<Option<String>>
where
    F: Fn(&str) -> std::result::Result<String, env::VarError>,
{
    match lookup(key.as_str()) {
        Ok(value) if value.trim().is_empty() => Err(ClientError::Config(format!(
            "{} must not be empty",
            key.as_str()
        ))),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ClientError::Config(format!(
            "{} must be valid UTF-8",
            key.as_str()
        ))),
    }
}

fn parse_timeout(value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ClientError::Config(format!(
            "{} must be a positive integer, got: {}",
            ConfigEnv::TimeoutSeconds.as_str(),
            value
        ))),
    }
}

fn parse_bool(key: ConfigEnv, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ClientError::Config(format!(
            "{} must be true/false or 1/0, got: {}",
            key.as_str(),
            value
        ))),
    }
}
