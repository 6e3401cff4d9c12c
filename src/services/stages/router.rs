//! Router stage: answers the query with the model matching its category.

use std::sync::Arc;

use crate::domain::errors::ModelClientError;
use crate::domain::models::{Category, ConversationState, PipelineStage};
use crate::domain::ports::{ChatMessage, ModelClient};
use crate::services::context_window::replay_messages;

use super::Stage;

/// Router/processor stage.
///
/// `code` goes to the code client; every other category, including
/// `unclassified`, goes to the natural-language client.
pub struct Router {
    code_client: Arc<dyn ModelClient>,
    natural_language_client: Arc<dyn ModelClient>,
    code_instruction: String,
    natural_language_instruction: String,
    history_window: Option<usize>,
}

impl Router {
    pub fn new(
        code_client: Arc<dyn ModelClient>,
        natural_language_client: Arc<dyn ModelClient>,
        code_instruction: impl Into<String>,
        natural_language_instruction: impl Into<String>,
    ) -> Self {
        Self {
            code_client,
            natural_language_client,
            code_instruction: code_instruction.into(),
            natural_language_instruction: natural_language_instruction.into(),
            history_window: None,
        }
    }

    /// Cap the replayed history; see [`crate::services::context_window`].
    #[must_use]
    pub const fn with_history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window;
        self
    }

    /// Client selected for `category`.
    pub fn select(&self, category: Category) -> &Arc<dyn ModelClient> {
        if category.is_code() {
            &self.code_client
        } else {
            &self.natural_language_client
        }
    }

    fn instruction(&self, category: Category) -> &str {
        if category.is_code() {
            &self.code_instruction
        } else {
            &self.natural_language_instruction
        }
    }

    /// Answer the current query and write the trimmed reply into `state`.
    pub async fn process(&self, state: &mut ConversationState) -> Result<(), ModelClientError> {
        let reply = self
            .select(state.category)
            .invoke(&self.prompt(state))
            .await?;
        self.apply(state, &reply);
        Ok(())
    }
}

impl Stage for Router {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Router
    }

    fn client_for(&self, state: &ConversationState) -> &dyn ModelClient {
        self.select(state.category).as_ref()
    }

    /// `[instruction, ...history, user(query)]`
    fn prompt(&self, state: &ConversationState) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(state.history().len() + 2);
        messages.push(ChatMessage::system(self.instruction(state.category)));
        messages.extend(replay_messages(state.history(), self.history_window));
        messages.push(ChatMessage::user(state.query.clone()));
        messages
    }

    fn apply(&self, state: &mut ConversationState, reply: &str) {
        state.response = reply.trim().to_string();
    }
}
