use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ModelClientError;
use crate::domain::models::{Message, Role};

/// Role of a message sent to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single role-tagged message in a model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        };
        Self {
            role,
            content: message.content.clone(),
        }
    }
}

/// Port trait for a text-generation backend.
///
/// This is a **port** in hexagonal architecture terminology: the pipeline
/// stages depend on this trait, and adapters in the infrastructure layer
/// (e.g. the Ollama HTTP client) implement it. Test doubles implement it
/// too, which is how every stage is exercised without a model server.
///
/// # Contract
///
/// - `invoke` receives the full, ordered message sequence for one call and
///   returns the complete generated text (no streaming).
/// - Implementations may retry transient failures internally; the pipeline
///   never retries.
/// - Implementations must be `Send + Sync` so one client can be shared by
///   several stages and sessions behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// async fn ask(client: Arc<dyn ModelClient>, question: &str) -> Result<String, ModelClientError> {
///     client
///         .invoke(&[
///             ChatMessage::system("Answer in one sentence."),
///             ChatMessage::user(question),
///         ])
///         .await
/// }
/// ```
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Identifier of the backing model, used in logs and observer events.
    fn model_id(&self) -> &str;

    /// Generate a reply for the given messages.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelClientError>;
}
