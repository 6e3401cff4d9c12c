use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::ModelClientError;

/// Errors that can occur when talking to an Ollama server
#[derive(Error, Debug)]
pub enum OllamaError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model or endpoint not found (HTTP 404), usually a model that was never pulled
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server error (HTTP 5xx) or overload (HTTP 429)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Unknown or unexpected status
    #[error("Unknown error ({0}): {1}")]
    Unknown(StatusCode, String),
}

impl OllamaError {
    /// Map a non-success HTTP status and body to an error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => Self::ServerError(status, body),
            s if s.is_server_error() => Self::ServerError(status, body),
            _ => Self::Unknown(status, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ServerError(_, _) | Self::Timeout | Self::NetworkError(_)
        )
    }
}

impl From<reqwest::Error> for OllamaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::NetworkError(format!("failed to decode response: {err}"))
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

impl From<OllamaError> for ModelClientError {
    fn from(err: OllamaError) -> Self {
        match err {
            OllamaError::Timeout => Self::Timeout,
            OllamaError::NetworkError(msg) => Self::Transport(msg),
            OllamaError::ServerError(status, body) | OllamaError::Unknown(status, body) => {
                Self::Server {
                    status: status.as_u16(),
                    body,
                }
            }
            OllamaError::InvalidRequest(body) => Self::Server { status: 400, body },
            OllamaError::NotFound(body) => Self::Server { status: 404, body },
            OllamaError::Serialization(err) => Self::InvalidResponse(err.to_string()),
        }
    }
}
