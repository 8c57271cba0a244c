//! Error types for the deployments client.

use crate::stats::StatsMismatch;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Errors that can occur when using the deployments client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered, but with an unexpected status code or shape.
    #[error("request failed (status {status}): {message}")]
    RequestFailed {
        /// HTTP status code of the response.
        status: u16,
        /// Error message from the server, or the check that failed.
        message: String,
        /// Snapshot of the response for diagnostics.
        response: Box<RawResponse>,
    },

    /// The server could not be reached or the exchange broke down.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Deployment statistics differ from the expected counters.
    #[error(transparent)]
    StatsMismatch(#[from] StatsMismatch),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to read a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status carried by a [`ClientError::RequestFailed`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw response carried by a [`ClientError::RequestFailed`].
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::RequestFailed { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Whether the server was unreachable or the connection failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the server responded with something unexpected.
    pub fn is_request_failed(&self) -> bool {
        matches!(self, Self::RequestFailed { .. })
    }

    pub(crate) fn request_failed(response: RawResponse, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: response.status.as_u16(),
            message: message.into(),
            response: Box::new(response),
        }
    }
}

/// A fully read HTTP response, kept for inspection after a failed check.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Error message reported by the server, if the body is a JSON error object.
    pub fn error_message(&self) -> Option<String> {
        let json = serde_json::from_str::<serde_json::Value>(&self.body).ok()?;
        json["error"]
            .as_str()
            .or_else(|| json["message"].as_str())
            .map(str::to_string)
    }

    /// Request ID the server attached to its error body.
    pub fn request_id(&self) -> Option<String> {
        let json = serde_json::from_str::<serde_json::Value>(&self.body).ok()?;
        json["request_id"].as_str().map(str::to_string)
    }

    /// Message to report for this response: the server error, the body, or a fallback.
    pub(crate) fn describe(&self, fallback: &str) -> String {
        if let Some(message) = self.error_message() {
            return message;
        }
        if self.body.trim().is_empty() {
            fallback.to_string()
        } else {
            self.body.clone()
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
