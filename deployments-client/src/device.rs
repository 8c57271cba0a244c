//! Device-facing deployment operations.
//!
//! Every call carries the device's own token rather than the management
//! token configured on the [`ApiClient`].

use crate::client::{ApiClient, Auth, decode_json, read_raw};
use crate::error::{ClientError, Result};
use crate::types::{DeploymentInstructions, DeploymentLog, LogLevel, LogMessage, StatusReport};
use reqwest::{Method, StatusCode};

/// Client for the device deployments endpoints.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    api: ApiClient,
}

impl DeviceClient {
    /// Wrap an API client pointed at the deployments API.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Ask for the next deployment pending for this device.
    ///
    /// # Returns
    ///
    /// `Some(instructions)` when a deployment is pending, `None` when the
    /// server answers `204 No Content`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] for any status other than 200
    /// or 204.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use deployments_client::{ApiClient, DeviceClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let device = DeviceClient::new(ApiClient::new("http://localhost:8080/api/0.0.1")?);
    /// match device.get_next_deployment("device-token", "release-1", "beaglebone").await? {
    ///     Some(next) => println!("Install {} from {}", next.artifact.artifact_name, next.artifact.source.uri),
    ///     None => println!("Nothing to do"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_next_deployment(
        &self,
        token: &str,
        artifact_name: &str,
        device_type: &str,
    ) -> Result<Option<DeploymentInstructions>> {
        let path = format!(
            "device/deployments/next?artifact_name={}&device_type={}",
            urlencoding::encode(artifact_name),
            urlencoding::encode(device_type)
        );
        let request = self.api.request(Method::GET, &path, Auth::Device(token));
        let response = self.api.send(request).await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => {
                let instructions: DeploymentInstructions = decode_json(response).await?;
                tracing::debug!(deployment_id = %instructions.id, "device has a pending deployment");
                Ok(Some(instructions))
            }
            _ => {
                let raw = read_raw(response).await?;
                let message = raw.describe("expected status 200 or 204");
                Err(ClientError::request_failed(raw, message))
            }
        }
    }

    /// Report the device's progress on a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] unless the server answers
    /// `204 No Content`.
    pub async fn report_status(
        &self,
        token: &str,
        deployment_id: &str,
        report: impl Into<StatusReport>,
    ) -> Result<()> {
        let report = report.into();
        let path = format!("device/deployments/{}/status", deployment_id);
        let request = self
            .api
            .request(Method::PUT, &path, Auth::Device(token))
            .json(&report);
        let response = self.api.send(request).await?;
        self.api
            .expect_empty(response, StatusCode::NO_CONTENT)
            .await?;

        tracing::debug!(deployment_id = %deployment_id, status = %report.status, "reported device status");
        Ok(())
    }

    /// Upload the device's deployment log.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] unless the server answers
    /// `204 No Content`.
    pub async fn upload_logs(&self, token: &str, deployment_id: &str, log: &DeploymentLog) -> Result<()> {
        let path = format!("device/deployments/{}/log", deployment_id);
        let request = self
            .api
            .request(Method::PUT, &path, Auth::Device(token))
            .json(log);
        let response = self.api.send(request).await?;
        self.api.expect_empty(response, StatusCode::NO_CONTENT).await
    }

    /// Upload plain text lines as a deployment log, stamped now at `info`.
    ///
    /// # Errors
    ///
    /// Same as [`DeviceClient::upload_logs`].
    pub async fn upload_log_lines<I, S>(&self, token: &str, deployment_id: &str, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let log: DeploymentLog = lines
            .into_iter()
            .map(|line| LogMessage::now(LogLevel::Info, line))
            .collect();
        self.upload_logs(token, deployment_id, &log).await
    }
}
