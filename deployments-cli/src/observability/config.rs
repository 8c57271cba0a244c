//! Configuration types for CLI logging.

use std::env;
use std::io::IsTerminal;
use std::str::FromStr;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "DEPLOYMENTS_LOG_FORMAT";
/// Environment variable holding the log filter.
pub const LOG_LEVEL_ENV: &str = "DEPLOYMENTS_LOG_LEVEL";
/// Environment variable enabling file and line in log output.
pub const LOG_LOCATION_ENV: &str = "DEPLOYMENTS_LOG_LOCATION";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for structured logging.
    Json,
    /// Human-readable multi-line format.
    Pretty,
    /// Compact single-line format.
    #[default]
    Compact,
}

impl LogFormat {
    /// Pretty on a terminal, compact otherwise.
    pub fn detect() -> Self {
        if std::io::stderr().is_terminal() {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "unknown log format '{}', expected json, pretty or compact",
                other
            )),
        }
    }
}

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log output format.
    log_format: LogFormat,
    /// Log level filter (e.g., "info", "warn,deployments_client=debug").
    log_filter: String,
    /// Whether to include source location in logs.
    include_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: "warn".to_string(),
            include_location: false,
        }
    }
}

impl TracingConfig {
    /// Create a new builder.
    pub fn builder() -> TracingConfigBuilder {
        TracingConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// `default_filter` is used when neither `DEPLOYMENTS_LOG_LEVEL` nor
    /// `RUST_LOG` is set. An unknown `DEPLOYMENTS_LOG_FORMAT` falls back to
    /// the detected format.
    pub fn from_env(default_filter: &str) -> Self {
        let log_format = env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| s.parse::<LogFormat>().ok())
            .unwrap_or_else(LogFormat::detect);

        let log_filter = env::var(LOG_LEVEL_ENV)
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_filter.to_string());

        Self::builder()
            .log_format(log_format)
            .log_filter(log_filter)
            .include_location(
                env::var(LOG_LOCATION_ENV)
                    .map(|s| s == "true" || s == "1")
                    .unwrap_or(false),
            )
            .build()
    }

    /// Get the log format.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Get the log filter.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Check if source location should be included.
    pub fn include_location(&self) -> bool {
        self.include_location
    }
}

/// Builder for TracingConfig.
#[derive(Debug, Clone, Default)]
pub struct TracingConfigBuilder {
    log_format: Option<LogFormat>,
    log_filter: Option<String>,
    include_location: Option<bool>,
}

impl TracingConfigBuilder {
    /// Set the log format.
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Set the log filter.
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Include source location in logs.
    pub fn include_location(mut self, include: bool) -> Self {
        self.include_location = Some(include);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TracingConfig {
        let defaults = TracingConfig::default();
        TracingConfig {
            log_format: self.log_format.unwrap_or(defaults.log_format),
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
            include_location: self.include_location.unwrap_or(defaults.include_location),
        }
    }
}
