//! The three pipeline stages.
//!
//! Each stage is split into the parts the engine needs: which client to call,
//! what to send it, and how to fold the reply back into the conversation
//! state. The engine owns the call itself so deadlines and observer events
//! are handled in one place.

pub mod checker;
pub mod classifier;
pub mod router;

pub use checker::Checker;
pub use classifier::{normalize_label, Classifier, KeywordOverride};
pub use router::Router;

use crate::domain::models::{ConversationState, PipelineStage};
use crate::domain::ports::{ChatMessage, ModelClient};

/// One transformation step of the pipeline.
pub trait Stage: Send + Sync {
    fn kind(&self) -> PipelineStage;

    /// Client this stage calls for the given state.
    fn client_for(&self, state: &ConversationState) -> &dyn ModelClient;

    /// Messages sent to the client.
    fn prompt(&self, state: &ConversationState) -> Vec<ChatMessage>;

    /// Fold the model reply into the state.
    fn apply(&self, state: &mut ConversationState, reply: &str);
}
