//! Device inventory operations.

use crate::client::{ApiClient, Auth};
use crate::error::Result;
use reqwest::{Method, StatusCode};
use serde::Serialize;

/// Client for the device inventory API.
///
/// Unlike the other clients this one points at the inventory service's
/// base URL, not the deployments API.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    api: ApiClient,
}

impl InventoryClient {
    /// Wrap an API client pointed at the inventory API.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Report inventory attributes on behalf of a device.
    ///
    /// `attributes` is sent as the JSON body; usually a slice of
    /// [`Attribute`](crate::Attribute).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`](crate::ClientError::RequestFailed)
    /// unless the server answers `200 OK`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use deployments_client::{ApiClient, Attribute, InventoryClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let inventory = InventoryClient::new(ApiClient::new("http://localhost:8080/api/0.1.0")?);
    /// let attributes = vec![
    ///     Attribute::new("device_type", "beaglebone"),
    ///     Attribute::new("artifact_name", "release-1"),
    /// ];
    /// inventory.report_attributes("device-token", &attributes).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn report_attributes<T>(&self, token: &str, attributes: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let request = self
            .api
            .request(Method::PATCH, "attributes", Auth::Device(token))
            .json(attributes);
        let response = self.api.send(request).await?;
        self.api.expect_empty(response, StatusCode::OK).await
    }
}
