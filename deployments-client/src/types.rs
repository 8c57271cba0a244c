//! Request and response types for the deployments, device and inventory APIs.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Upload data for a new artifact.
///
/// Sent as `multipart/form-data` with parts in the order `description`,
/// `size`, `artifact`; the server rejects an artifact part that precedes
/// its size.
#[derive(Debug, Clone)]
pub struct ArtifactUpload {
    /// Free-form description.
    pub description: String,
    /// Size of the artifact in bytes.
    pub size: u64,
    /// Artifact contents.
    pub data: Vec<u8>,
    /// File name reported for the artifact part.
    pub file_name: String,
}

impl ArtifactUpload {
    /// Upload for in-memory data; `size` is the data length.
    pub fn new(description: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            description: description.into(),
            size: data.len() as u64,
            data,
            file_name: "firmware".to_string(),
        }
    }

    /// Read an artifact file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`](crate::ClientError::Io) if the file
    /// cannot be read.
    pub async fn from_file(
        path: impl AsRef<Path>,
        description: impl Into<String>,
    ) -> crate::Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(description, data))
    }

    /// Override the declared size.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Override the file name of the artifact part.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

/// Artifact metadata as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub device_types_compatible: Vec<String>,
    #[serde(default)]
    pub signed: bool,
    /// ISO 8601 timestamp of the last modification.
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Editable artifact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactUpdate {
    pub description: String,
}

/// Temporary download link for an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub uri: String,
    /// ISO 8601 expiry timestamp.
    pub expire: String,
}

/// Artifacts sharing one artifact name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Artifacts", default)]
    pub artifacts: Vec<Artifact>,
}

/// A named server limit and its current usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub limit: u64,
    pub usage: u64,
}

/// Request body for creating a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDeployment {
    /// Deployment name.
    pub name: String,
    /// Name of the artifact to roll out.
    pub artifact_name: String,
    /// Device IDs to deploy to.
    pub devices: Vec<String>,
}

impl NewDeployment {
    pub fn new(
        name: impl Into<String>,
        artifact_name: impl Into<String>,
        devices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_name: artifact_name.into(),
            devices: devices.into_iter().map(Into::into).collect(),
        }
    }
}

/// A deployment as reported by the management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub name: String,
    pub artifact_name: String,
    /// ISO 8601 creation timestamp.
    pub created: String,
    /// ISO 8601 completion timestamp.
    #[serde(default)]
    pub finished: Option<String>,
    pub status: DeploymentStatus,
    #[serde(default)]
    pub device_count: Option<u32>,
    #[serde(default)]
    pub artifacts: Vec<String>,
}

/// Overall deployment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    #[serde(rename = "inprogress")]
    InProgress,
    Finished,
}

/// Status filter for deployment lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatusFilter {
    Pending,
    InProgress,
    Finished,
    Aborted,
}

impl DeploymentStatusFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Finished => "finished",
            Self::Aborted => "aborted",
        }
    }
}

/// Filters for listing deployments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentQuery {
    /// Match against deployment or artifact name.
    pub search: Option<String>,
    pub status: Option<DeploymentStatusFilter>,
    /// Unix timestamp, seconds.
    pub created_before: Option<i64>,
    /// Unix timestamp, seconds.
    pub created_after: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl DeploymentQuery {
    /// Render as a query string, without the leading `?`.
    pub(crate) fn to_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(ref search) = self.search {
            params.push(format!("search={}", urlencoding::encode(search)));
        }
        if let Some(status) = self.status {
            params.push(format!("status={}", status.as_str()));
        }
        if let Some(before) = self.created_before {
            params.push(format!("created_before={}", before));
        }
        if let Some(after) = self.created_after {
            params.push(format!("created_after={}", after));
        }
        if let Some(page) = self.page {
            params.push(format!("page={}", page));
        }
        if let Some(per_page) = self.per_page {
            params.push(format!("per_page={}", per_page));
        }

        params.join("&")
    }
}

/// Status of a deployment on a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceDeploymentStatus {
    Success,
    Pending,
    Failure,
    Downloading,
    Installing,
    Rebooting,
    #[serde(rename = "noartifact")]
    NoArtifact,
    #[serde(rename = "already-installed")]
    AlreadyInstalled,
    Aborted,
    Decommissioned,
}

impl DeviceDeploymentStatus {
    /// Every status a device can report.
    pub const ALL: [DeviceDeploymentStatus; 10] = [
        Self::Success,
        Self::Pending,
        Self::Failure,
        Self::Downloading,
        Self::Installing,
        Self::Rebooting,
        Self::NoArtifact,
        Self::AlreadyInstalled,
        Self::Aborted,
        Self::Decommissioned,
    ];

    /// The status name on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Failure => "failure",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::Rebooting => "rebooting",
            Self::NoArtifact => "noartifact",
            Self::AlreadyInstalled => "already-installed",
            Self::Aborted => "aborted",
            Self::Decommissioned => "decommissioned",
        }
    }
}

impl fmt::Display for DeviceDeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceDeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown device deployment status: {}", s))
    }
}

/// Status report sent by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: DeviceDeploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substate: Option<String>,
}

impl From<DeviceDeploymentStatus> for StatusReport {
    fn from(status: DeviceDeploymentStatus) -> Self {
        Self {
            status,
            substate: None,
        }
    }
}

/// Per-device entry of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDeployment {
    /// Device ID.
    pub id: String,
    pub status: DeviceDeploymentStatus,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub finished: Option<String>,
    #[serde(default)]
    pub substate: Option<String>,
    /// Whether the device uploaded a deployment log.
    #[serde(default)]
    pub log: bool,
}

/// Instructions returned to a device that has a pending deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInstructions {
    /// Deployment ID.
    pub id: String,
    pub artifact: ArtifactInstructions,
}

/// The artifact part of [`DeploymentInstructions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInstructions {
    pub artifact_name: String,
    pub source: DownloadLink,
    #[serde(default)]
    pub device_types_compatible: Vec<String>,
}

/// Severity of a deployment log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Debug,
    Warn,
    Error,
    Other,
}

/// A single line of a device deployment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    /// RFC 3339 timestamp in UTC.
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogMessage {
    /// A message stamped with the given time.
    pub fn at(timestamp: DateTime<Utc>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.into(),
        }
    }

    /// A message stamped with the current time.
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message)
    }
}

/// Deployment log uploaded by a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentLog {
    pub messages: Vec<LogMessage>,
}

impl FromIterator<LogMessage> for DeploymentLog {
    fn from_iter<I: IntoIterator<Item = LogMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

/// A device inventory attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
        }
    }
}
