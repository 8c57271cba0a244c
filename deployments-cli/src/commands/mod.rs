//! CLI command implementations.

pub mod artifacts;
pub mod deployments;
pub mod device;
pub mod inventory;

use anyhow::{Context, Result};
use clap::Args;
use deployments_client::{ClientConfig, Clients};
use serde::Serialize;
use std::time::Duration;

/// Connection flags shared by every command.
///
/// Each flag overrides the matching `DEPLOYMENTS_*` environment variable.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Deployments API base URL (e.g., http://localhost:8080/api/0.0.1)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Inventory API base URL
    #[arg(long, global = true)]
    pub inventory_url: Option<String>,

    /// Management bearer token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, global = true)]
    pub insecure: bool,
}

impl ConnectionArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Result<ClientConfig> {
        let base = ClientConfig::from_env().context("Invalid DEPLOYMENTS_* environment")?;
        self.apply(base)
    }

    /// Build every resource client.
    pub fn clients(&self) -> Result<Clients> {
        let config = self.config()?;
        tracing::debug!(url = %config.deployments_url, "using deployments API");
        Clients::from_config(&config).context("Failed to create API clients")
    }

    fn apply(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Some(ref url) = self.url {
            config.deployments_url = url.clone();
        }
        if let Some(ref url) = self.inventory_url {
            config.inventory_url = Some(url.clone());
        }
        if let Some(ref token) = self.token {
            config.management_token = Some(token.clone());
        }
        if let Some(secs) = self.timeout {
            if secs == 0 {
                anyhow::bail!("--timeout must be a positive number of seconds");
            }
            config.timeout = Duration::from_secs(secs);
        }
        if self.insecure {
            config.accept_invalid_certs = true;
        }
        Ok(config)
    }
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}
