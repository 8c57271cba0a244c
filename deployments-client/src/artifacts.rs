//! Artifact management operations.

use crate::client::{ApiClient, Auth};
use crate::error::Result;
use crate::lifecycle::{self, ScopeError};
use crate::types::{Artifact, ArtifactUpdate, ArtifactUpload, DownloadLink};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use std::future::Future;

/// Client for the artifact management endpoints.
#[derive(Debug, Clone)]
pub struct ArtifactsClient {
    api: ApiClient,
}

impl ArtifactsClient {
    /// Wrap an API client pointed at the deployments API.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Upload a new artifact.
    ///
    /// # Returns
    ///
    /// Returns the artifact ID taken from the `Location` header.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`](crate::ClientError::RequestFailed)
    /// unless the server answers `201 Created` with a `Location` header.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use deployments_client::{ApiClient, ArtifactsClient, ArtifactUpload};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let artifacts = ArtifactsClient::new(ApiClient::new("http://localhost:8080/api/0.0.1")?);
    /// let upload = ArtifactUpload::from_file("release-1.mender", "nightly build").await?;
    /// let id = artifacts.add_artifact(upload).await?;
    /// println!("Uploaded artifact {}", id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add_artifact(&self, upload: ArtifactUpload) -> Result<String> {
        let artifact = Part::bytes(upload.data)
            .file_name(upload.file_name)
            .mime_str("application/octet-stream")?;

        let form = Form::new()
            .text("description", upload.description)
            .text("size", upload.size.to_string())
            .part("artifact", artifact);

        let request = self
            .api
            .request(Method::POST, "artifacts", Auth::Management)
            .multipart(form);
        let response = self.api.send(request).await?;
        let id = self
            .api
            .expect_location(response, StatusCode::CREATED)
            .await?;

        tracing::debug!(artifact_id = %id, "added artifact");
        Ok(id)
    }

    /// Delete an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`](crate::ClientError::RequestFailed)
    /// unless the server answers `204 No Content`.
    pub async fn delete_artifact(&self, artifact_id: &str) -> Result<()> {
        let path = format!("artifacts/{}", artifact_id);
        let request = self.api.request(Method::DELETE, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api
            .expect_empty(response, StatusCode::NO_CONTENT)
            .await?;

        tracing::debug!(artifact_id = %artifact_id, "deleted artifact");
        Ok(())
    }

    /// Get artifact metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is not found or the request fails.
    pub async fn get_artifact(&self, artifact_id: &str) -> Result<Artifact> {
        let path = format!("artifacts/{}", artifact_id);
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// List all artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_artifacts(&self) -> Result<Vec<Artifact>> {
        let request = self.api.request(Method::GET, "artifacts", Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Update editable artifact metadata.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers `204 No Content`.
    pub async fn edit_artifact(&self, artifact_id: &str, update: &ArtifactUpdate) -> Result<()> {
        let path = format!("artifacts/{}", artifact_id);
        let request = self
            .api
            .request(Method::PUT, &path, Auth::Management)
            .json(update);
        let response = self.api.send(request).await?;
        self.api.expect_empty(response, StatusCode::NO_CONTENT).await
    }

    /// Get a temporary download link for an artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is not found or the request fails.
    pub async fn artifact_download_link(&self, artifact_id: &str) -> Result<DownloadLink> {
        let path = format!("artifacts/{}/download", artifact_id);
        let request = self.api.request(Method::GET, &path, Auth::Management);
        let response = self.api.send(request).await?;
        self.api.expect_json(response, StatusCode::OK).await
    }

    /// Upload an artifact, run `scope` with its ID, then delete it.
    ///
    /// The artifact is deleted exactly once whether `scope` succeeds, fails
    /// or panics. See [`lifecycle::scoped`] for how failures combine.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use deployments_client::{ApiClient, ArtifactsClient, ArtifactUpload, ClientError};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let artifacts = &ArtifactsClient::new(ApiClient::new("http://localhost:8080/api/0.0.1")?);
    /// let upload = ArtifactUpload::new("scratch", vec![0u8; 1024]);
    /// let name = artifacts
    ///     .with_added_artifact(upload, |id| async move {
    ///         let artifact = artifacts.get_artifact(&id).await?;
    ///         Ok::<_, ClientError>(artifact.name)
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_added_artifact<T, E, F, Fut>(
        &self,
        upload: ArtifactUpload,
        scope: F,
    ) -> std::result::Result<T, ScopeError<E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        lifecycle::scoped(
            "artifact",
            self.add_artifact(upload),
            |id| async move { self.delete_artifact(&id).await },
            scope,
        )
        .await
    }
}
