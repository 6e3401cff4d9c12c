//! Domain errors for the Turnstile pipeline.

use std::path::PathBuf;
use thiserror::Error;

use super::models::{Category, PipelineStage};

/// Failure reported by a [`ModelClient`](super::ports::ModelClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Model call timed out")]
    Timeout,

    #[error("Model server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Stage deadline of {0}s exceeded")]
    DeadlineExceeded(u64),
}

impl ModelClientError {
    /// Returns true if repeating the same call may succeed.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidResponse(_) | Self::DeadlineExceeded(_) => false,
        }
    }
}

/// A stage of the pipeline failed; the turn was aborted.
///
/// In every case conversation history is left exactly as it was before the
/// turn started.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Classifier model call failed. No category was recorded.
    #[error("Classification failed on model {model}: {source}")]
    Classification {
        model: String,
        #[source]
        source: ModelClientError,
    },

    /// Router model call failed. The category from the classifier is kept.
    #[error("Routing {category} query failed on model {model}: {source}")]
    Routing {
        model: String,
        category: Category,
        #[source]
        source: ModelClientError,
    },

    /// Checker model call failed. The router's answer is still available.
    #[error("Checking response failed on model {model}: {source}")]
    Check {
        model: String,
        unchecked_response: String,
        #[source]
        source: ModelClientError,
    },
}

impl PipelineError {
    pub const fn stage(&self) -> PipelineStage {
        match self {
            Self::Classification { .. } => PipelineStage::Classifier,
            Self::Routing { .. } => PipelineStage::Router,
            Self::Check { .. } => PipelineStage::Checker,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Classification { model, .. }
            | Self::Routing { model, .. }
            | Self::Check { model, .. } => model,
        }
    }

    pub fn client_error(&self) -> &ModelClientError {
        match self {
            Self::Classification { source, .. }
            | Self::Routing { source, .. }
            | Self::Check { source, .. } => source,
        }
    }

    /// The unchecked router answer when only the checker failed.
    pub fn degraded_response(&self) -> Option<&str> {
        match self {
            Self::Check {
                unchecked_response, ..
            } => Some(unchecked_response.as_str()),
            _ => None,
        }
    }
}

/// Failure reading or writing the durable transcript.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Transcript I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize transcript: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transcript at {} is not a valid JSON array of turns: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Errors surfaced to the driver of a conversation session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The turn completed but could not be written to disk. The turn is kept
    /// in memory and will be flushed by the next successful write.
    #[error("Turn completed but transcript was not saved: {source}")]
    Persistence {
        response: String,
        #[source]
        source: PersistenceError,
    },
}

impl SessionError {
    /// Best available answer for the turn, if any was produced.
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Pipeline(err) => err.degraded_response(),
            Self::Persistence { response, .. } => Some(response.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ModelClientError::Timeout.is_transient());
        assert!(ModelClientError::Transport("connection refused".to_string()).is_transient());
        assert!(ModelClientError::Server {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!ModelClientError::Server {
            status: 404,
            body: "model not found".to_string()
        }
        .is_transient());
        assert!(!ModelClientError::DeadlineExceeded(30).is_transient());
    }

    #[test]
    fn test_degraded_response_only_for_checker() {
        let check = PipelineError::Check {
            model: "mistral:latest".to_string(),
            unchecked_response: "draft".to_string(),
            source: ModelClientError::Timeout,
        };
        assert_eq!(check.degraded_response(), Some("draft"));
        assert_eq!(check.stage(), PipelineStage::Checker);

        let routing = PipelineError::Routing {
            model: "phi:latest".to_string(),
            category: Category::NaturalLanguage,
            source: ModelClientError::Timeout,
        };
        assert_eq!(routing.degraded_response(), None);
        assert_eq!(routing.model(), "phi:latest");
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::Classification {
            model: "mistral:latest".to_string(),
            source: ModelClientError::Transport("connection refused".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Classification failed on model mistral:latest: Transport error: connection refused"
        );
    }

    #[test]
    fn test_session_error_response() {
        let err = SessionError::Persistence {
            response: "saved later".to_string(),
            source: PersistenceError::Corrupt {
                path: PathBuf::from("x.json"),
                reason: "eof".to_string(),
            },
        };
        assert_eq!(err.response(), Some("saved later"));
    }
}
