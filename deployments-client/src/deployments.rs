//! Deployment management operations.

use crate::client::{ApiClient, Auth, read_raw};
use crate::error::Result;
use crate::lifecycle::{self, ScopeError};
use crate::stats::{DeploymentStats, ExpectedStats};
use crate::types::{Deployment, DeploymentQuery, DeviceDeployment, Limit, NewDeployment, Release};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::future::Future;

/// Request body for changing a deployment's status.
#[derive(Debug, Serialize)]
struct StatusChange<'a> {
    status: &'a str,
}

/// Client for the deployment management endpoints.
#[derive(Debug, Clone)]
pub struct DeploymentsClient {
    api: ApiClient,
}

impl DeploymentsClient {
    /// Wrap an API client pointed at the deployments API.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Create a deployment.
    ///
    /// # Returns
    ///
    /// Returns the deployment ID taken from the `Location` header.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`](crate::ClientError::RequestFailed)
    /// unless the server answers `201 Created` with a `Location` header.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use deployments_client::{ApiClient, DeploymentsClient, NewDeployment};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let deployments = DeploymentsClient::new(ApiClient::new("http://localhost:8080/api/0.0.1")?);
    /// let new = NewDeployment::new("nightly", "release-1", ["device-1", "device-2"]);
    /// let id = deployments.add_deployment(&new).await?;
    /// println!("Created deployment {}", id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add_deployment(&self, deployment: &NewDeployment) -> Result<String> {
        let request = self
            .api
            .request(Method::POST, "deployments", Auth::Management)
            .json(deployment);
        let response = self.api.send(request).await?;
        let id = self
            .api
            .expect_location(response, StatusCode::CREATED)
            .await?;

        tracing::debug!(deployment_id = %id, "added new deployment");
        Ok(id)
    }

    /// Abort a deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`](crate::ClientError::RequestFailed)
    /// unless the server answers `204 No Content`; a finished deployment
    /// yields 422.
    pub async fn abort_deployment(&self, deployment_id: &str) -> Result<()> {
        let path = format!("deployments/{}/status", deployment_id);
        let request = self
            .api
            .request(Method::PUT, &path, Auth::Management)
            .json(&StatusChange { status: "aborted" });
        let response = self.api.send(request).await?;
        self.api
            .expect_empty(response, StatusCode::NO_CONTENT)
            .await?;

        tracing::debug!(deployment_id = %deployment_id, "aborted deployment");
        Ok(())
    }

    /// Get a deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the deployment is not found or the request fails.
    pub async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment> {
        let path = format!("deployments/{}", deployment_id);
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// List deployments matching a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is rejected or the request fails.
    pub async fn list_deployments(&self, query: &DeploymentQuery) -> Result<Vec<Deployment>> {
        let query_string = query.to_query_string();
        let path = if query_string.is_empty() {
            "deployments".to_string()
        } else {
            format!("deployments?{}", query_string)
        };

        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Get the per-status device counts of a deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the deployment is not found or the request fails.
    pub async fn get_deployment_stats(&self, deployment_id: &str) -> Result<DeploymentStats> {
        let path = format!("deployments/{}/statistics", deployment_id);
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Fetch deployment statistics and compare them with `expected`.
    ///
    /// Counters missing from `expected` must be zero.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::StatsMismatch`](crate::ClientError::StatsMismatch)
    /// listing every counter that differs, or the error from fetching the
    /// statistics.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use deployments_client::{ApiClient, DeploymentsClient, ExpectedStats, StatCounter};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let deployments = DeploymentsClient::new(ApiClient::new("http://localhost:8080/api/0.0.1")?);
    /// let expected = ExpectedStats::new().with(StatCounter::Pending, 2);
    /// deployments.verify_deployment_stats("f00d", &expected).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verify_deployment_stats(
        &self,
        deployment_id: &str,
        expected: &ExpectedStats,
    ) -> Result<DeploymentStats> {
        let stats = self.get_deployment_stats(deployment_id).await?;
        stats.verify(expected)?;
        Ok(stats)
    }

    /// List the per-device status of a deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the deployment is not found or the request fails.
    pub async fn deployment_devices(&self, deployment_id: &str) -> Result<Vec<DeviceDeployment>> {
        let path = format!("deployments/{}/devices", deployment_id);
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Get the deployment log a device uploaded, as plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if no log exists or the request fails.
    pub async fn device_deployment_log(&self, deployment_id: &str, device_id: &str) -> Result<String> {
        let path = format!("deployments/{}/devices/{}/log", deployment_id, device_id);
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        let response = self.api.expect_status(response, StatusCode::OK).await?;
        Ok(read_raw(response).await?.body)
    }

    /// List releases, optionally only the one named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_releases(&self, name: Option<&str>) -> Result<Vec<Release>> {
        let path = match name {
            Some(name) => format!("deployments/releases?name={}", urlencoding::encode(name)),
            None => "deployments/releases".to_string(),
        };

        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Get a named limit, e.g. `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not know the limit (400) or the
    /// request fails.
    pub async fn get_limit(&self, name: &str) -> Result<Limit> {
        let path = format!("limits/{}", urlencoding::encode(name));
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Create a deployment, run `scope` with its ID, then abort it.
    ///
    /// The deployment is aborted exactly once whether `scope` succeeds,
    /// fails or panics. See [`lifecycle::scoped`] for how failures combine.
    pub async fn with_added_deployment<T, E, F, Fut>(
        &self,
        deployment: &NewDeployment,
        scope: F,
    ) -> std::result::Result<T, ScopeError<E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        lifecycle::scoped(
            "deployment",
            self.add_deployment(deployment),
            |id| async move { self.abort_deployment(&id).await },
            scope,
        )
        .await
    }
}
