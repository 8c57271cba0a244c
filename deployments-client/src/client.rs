//! Core HTTP client shared by the resource clients.

use crate::artifacts::ArtifactsClient;
use crate::config::ClientConfig;
use crate::deployments::DeploymentsClient;
use crate::device::DeviceClient;
use crate::error::{ClientError, RawResponse, Result};
use crate::inventory::InventoryClient;
use reqwest::header::LOCATION;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which credentials a request carries.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Auth<'a> {
    /// The management token configured on the client, if any.
    Management,
    /// A device token supplied for this call.
    Device(&'a str),
}

/// HTTP transport bound to one API base URL.
///
/// Resource clients wrap an `ApiClient`; it is cheap to clone because the
/// underlying connection pool is shared.
///
/// # Example
///
/// ```no_run
/// use deployments_client::{ApiClient, ArtifactsClient};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = ApiClient::new("http://localhost:8080/api/0.0.1")?
///     .with_token("management-token")
///     .with_timeout(Duration::from_secs(10))?;
///
/// let artifacts = ArtifactsClient::new(api);
/// let all = artifacts.list_artifacts().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API, including the version prefix.
    base_url: String,
    /// HTTP client.
    http: HttpClient,
    /// Optional management token, sent as `Bearer <token>`.
    token: Option<String>,
    /// TLS verification setting reapplied whenever `http` is rebuilt.
    accept_invalid_certs: bool,
}

impl ApiClient {
    /// Create a new client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_http(base_url, http_client(DEFAULT_TIMEOUT, false)?)
    }

    /// Create a client around an already configured `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_http(base_url: impl Into<String>, http: HttpClient) -> Result<Self> {
        let base_url = base_url.into();
        validate_url(&base_url)?;

        Ok(Self {
            base_url,
            http,
            token: None,
            accept_invalid_certs: false,
        })
    }

    /// Build a client from configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn from_config(config: &ClientConfig, base_url: &str) -> Result<Self> {
        let http = http_client(config.timeout, config.accept_invalid_certs)?;

        let mut client = Self::with_http(base_url, http)?;
        client.accept_invalid_certs = config.accept_invalid_certs;
        Ok(match &config.management_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    /// Set a management token.
    ///
    /// The token is sent in the `Authorization` header as `Bearer <token>`
    /// on management calls.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set a custom timeout for all requests.
    ///
    /// The HTTP client is rebuilt; the certificate setting from
    /// [`ApiClient::from_config`] carries over. Other settings of a client
    /// passed to [`ApiClient::with_http`] do not.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = http_client(timeout, self.accept_invalid_certs)?;
        Ok(self)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether invalid TLS certificates are accepted.
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Build a full URL from a path.
    pub(crate) fn url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Start a request with authentication applied.
    pub(crate) fn request(&self, method: Method, path: &str, auth: Auth<'_>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match auth {
            Auth::Management => match &self.token {
                Some(token) => builder.bearer_auth(token),
                None => builder,
            },
            Auth::Device(token) => builder.bearer_auth(token),
        }
    }

    /// Send a request. Any failure here is a transport failure.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");

        self.http
            .execute(request)
            .await
            .map_err(ClientError::Transport)
    }

    /// Check the status code, returning the response untouched on a match.
    pub(crate) async fn expect_status(
        &self,
        response: Response,
        expected: StatusCode,
    ) -> Result<Response> {
        if response.status() == expected {
            return Ok(response);
        }

        let raw = read_raw(response).await?;
        let message = raw.describe(&format!("expected status {}", expected.as_u16()));
        Err(ClientError::request_failed(raw, message))
    }

    /// Check the status code and discard the body.
    pub(crate) async fn expect_empty(&self, response: Response, expected: StatusCode) -> Result<()> {
        self.expect_status(response, expected).await?;
        Ok(())
    }

    /// Check the status code and deserialize the JSON body.
    pub(crate) async fn expect_json<T: DeserializeOwned>(
        &self,
        response: Response,
        expected: StatusCode,
    ) -> Result<T> {
        let response = self.expect_status(response, expected).await?;
        decode_json(response).await
    }

    /// Check the status code and extract the identifier from `Location`.
    pub(crate) async fn expect_location(
        &self,
        response: Response,
        expected: StatusCode,
    ) -> Result<String> {
        let response = self.expect_status(response, expected).await?;

        let id = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(id_from_location);

        match id {
            Some(id) => Ok(id),
            None => {
                let raw = read_raw(response).await?;
                Err(ClientError::request_failed(
                    raw,
                    "response is missing a usable Location header",
                ))
            }
        }
    }
}

/// Deserialize a JSON body. A body that does not match `T` is a failed request.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let raw = read_raw(response).await?;
    match serde_json::from_str::<T>(&raw.body) {
        Ok(value) => Ok(value),
        Err(err) => {
            let message = format!("unexpected response body: {}", err);
            Err(ClientError::request_failed(raw, message))
        }
    }
}

/// Read a response into a [`RawResponse`].
pub(crate) async fn read_raw(response: Response) -> Result<RawResponse> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

/// Extract a resource identifier from a `Location` header value.
///
/// The identifier is the last non-empty path segment; query and fragment
/// are ignored. `/artifacts/abc123` and `./deployments/abc123` both yield
/// `abc123`.
pub fn id_from_location(location: &str) -> Option<String> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location)
        .trim_end_matches('/');

    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() && segment != "." && segment != ".." => {
            Some(segment.to_string())
        }
        _ => None,
    }
}

fn http_client(timeout: Duration, accept_invalid_certs: bool) -> Result<HttpClient> {
    Ok(HttpClient::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?)
}

fn validate_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ClientError::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            url
        )));
    }
    Ok(())
}

/// All resource clients built from one configuration.
#[derive(Debug, Clone)]
pub struct Clients {
    /// Artifact management client.
    pub artifacts: ArtifactsClient,
    /// Deployment management client.
    pub deployments: DeploymentsClient,
    /// Device API client.
    pub device: DeviceClient,
    /// Inventory client, present when an inventory URL is configured.
    pub inventory: Option<InventoryClient>,
}

impl Clients {
    /// Build every client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let api = ApiClient::from_config(config, &config.deployments_url)?;
        let inventory = match &config.inventory_url {
            Some(url) => Some(InventoryClient::new(ApiClient::from_config(config, url)?)),
            None => None,
        };

        Ok(Self {
            artifacts: ArtifactsClient::new(api.clone()),
            deployments: DeploymentsClient::new(api.clone()),
            device: DeviceClient::new(api),
            inventory,
        })
    }
}
