//! Typed client for the artifact and deployment service REST API.
//!
//! This crate wraps the management, device and inventory endpoints used by
//! integration tests and the `deployments` CLI. Every operation performs a
//! single request, checks the status code against the one success value the
//! endpoint documents and returns an identifier or a decoded model.
//!
//! # Features
//!
//! - Artifact upload, lookup, editing and deletion
//! - Deployment creation, abort, listing and statistics checks
//! - Device-side next deployment, status reports and log upload
//! - Inventory attribute reports
//! - Scoped helpers that always clean up what they create
//!
//! # Example
//!
//! ```no_run
//! use deployments_client::{ArtifactUpload, ClientConfig, Clients, NewDeployment};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let clients = Clients::from_config(&config)?;
//!
//! // Upload an artifact
//! let upload = ArtifactUpload::from_file("release-1.mender", "nightly build").await?;
//! let artifact_id = clients.artifacts.add_artifact(upload).await?;
//!
//! // Roll it out to two devices
//! let new = NewDeployment::new("nightly", "release-1", ["device-1", "device-2"]);
//! let deployment_id = clients.deployments.add_deployment(&new).await?;
//!
//! let stats = clients.deployments.get_deployment_stats(&deployment_id).await?;
//! println!("{} devices pending", stats.pending.unwrap_or(0));
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ClientError>`:
//!
//! ```no_run
//! # use deployments_client::{ApiClient, ArtifactsClient, ClientError};
//! # async fn example() -> Result<(), ClientError> {
//! # let artifacts = ArtifactsClient::new(ApiClient::new("http://localhost:8080/api/0.0.1")?);
//! match artifacts.delete_artifact("abc123").await {
//!     Ok(()) => println!("Deleted"),
//!     Err(ClientError::RequestFailed { status: 404, .. }) => println!("Artifact not found"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod artifacts;
mod client;
mod config;
mod deployments;
mod device;
mod error;
mod inventory;
pub mod lifecycle;
mod stats;
mod types;

// Re-export the main types
pub use artifacts::ArtifactsClient;
pub use client::{ApiClient, Clients, DEFAULT_TIMEOUT, id_from_location};
pub use config::{ClientConfig, ConfigEnv, DEFAULT_API_VERSION, INVENTORY_API_VERSION, api_url};
pub use deployments::DeploymentsClient;
pub use device::DeviceClient;
pub use error::{ClientError, RawResponse, Result};
pub use inventory::InventoryClient;
pub use lifecycle::{ScopeError, scoped};
pub use stats::{CounterMismatch, DeploymentStats, ExpectedStats, StatCounter, StatsMismatch};
pub use types::{
    Artifact, ArtifactInstructions, ArtifactUpdate, ArtifactUpload, Attribute, Deployment,
    DeploymentInstructions, DeploymentLog, DeploymentQuery, DeploymentStatus,
    DeploymentStatusFilter, DeviceDeployment, DeviceDeploymentStatus, DownloadLink, Limit,
    LogLevel, LogMessage, NewDeployment, Release, StatusReport,
};
