//! Logging setup for the `deployments` CLI.
//!
//! Output goes to stderr so command results on stdout stay machine readable.
//!
//! # Configuration
//!
//! Logging format is controlled via `DEPLOYMENTS_LOG_FORMAT`:
//! - `json` - Structured JSON output
//! - `pretty` - Human-readable multi-line output (default for TTY)
//! - `compact` - Compact single-line format (default for non-TTY)
//!
//! The filter comes from `DEPLOYMENTS_LOG_LEVEL`, then `RUST_LOG`, then the
//! `-v` count.

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig};
pub use tracing_setup::init_tracing;
