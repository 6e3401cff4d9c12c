//! Checker stage: asks a model to validate or improve the routed answer.
//!
//! The checker's reply replaces the response unconditionally. There is no
//! approval gate, so a checker can make a correct answer worse; callers who
//! need the pre-check answer get it from the engine's error on checker
//! failure only.

use std::sync::Arc;

use crate::domain::errors::ModelClientError;
use crate::domain::models::{ConversationState, PipelineStage};
use crate::domain::ports::{ChatMessage, ModelClient};
use crate::services::context_window::replay_messages;

use super::Stage;

pub struct Checker {
    client: Arc<dyn ModelClient>,
    instruction: String,
    history_window: Option<usize>,
}

impl Checker {
    pub fn new(client: Arc<dyn ModelClient>, instruction: impl Into<String>) -> Self {
        Self {
            client,
            instruction: instruction.into(),
            history_window: None,
        }
    }

    #[must_use]
    pub const fn with_history_window(mut self, window: Option<usize>) -> Self {
        self.history_window = window;
        self
    }

    /// Replace `state.response` with the checked version.
    pub async fn check(&self, state: &mut ConversationState) -> Result<(), ModelClientError> {
        let reply = self.client.invoke(&self.prompt(state)).await?;
        self.apply(state, &reply);
        Ok(())
    }
}

impl Stage for Checker {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Checker
    }

    fn client_for(&self, _state: &ConversationState) -> &dyn ModelClient {
        self.client.as_ref()
    }

    /// `[instruction, ...history, user(query), assistant(response)]`
    ///
    /// The unchecked answer is sent as an assistant message following the
    /// query it answers.
    fn prompt(&self, state: &ConversationState) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(state.history().len() + 3);
        messages.push(ChatMessage::system(self.instruction.clone()));
        messages.extend(replay_messages(state.history(), self.history_window));
        messages.push(ChatMessage::user(state.query.clone()));
        messages.push(ChatMessage::assistant(state.response.clone()));
        messages
    }

    fn apply(&self, state: &mut ConversationState, reply: &str) {
        state.response = reply.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::ScriptedModelClient;

    #[tokio::test]
    async fn test_noop_checker_keeps_response() {
        let client = Arc::new(ScriptedModelClient::echo("checker-model"));
        let checker = Checker::new(client, "check it");
        let mut state = ConversationState::new();
        state.begin_turn("Tell me about Mars");
        state.response = "Mars is the fourth planet.".to_string();

        checker.check(&mut state).await.unwrap();

        assert_eq!(state.response, "Mars is the fourth planet.");
    }

    #[tokio::test]
    async fn test_checker_output_replaces_response() {
        let client = Arc::new(ScriptedModelClient::new(
            "checker-model",
            ["  Mars is the fourth planet from the Sun. "],
        ));
        let checker = Checker::new(client.clone(), "check it");
        let mut state = ConversationState::new();
        state.begin_turn("Tell me about Mars");
        state.response = "Mars is a planet.".to_string();

        checker.check(&mut state).await.unwrap();

        assert_eq!(state.response, "Mars is the fourth planet from the Sun.");
        assert_eq!(
            client.calls()[0],
            vec![
                ChatMessage::system("check it"),
                ChatMessage::user("Tell me about Mars"),
                ChatMessage::assistant("Mars is a planet."),
            ]
        );
    }

    #[tokio::test]
    async fn test_checker_failure_keeps_unchecked_response() {
        let client = Arc::new(ScriptedModelClient::failing(
            "checker-model",
            ModelClientError::Timeout,
        ));
        let checker = Checker::new(client, "check it");
        let mut state = ConversationState::new();
        state.begin_turn("q");
        state.response = "draft".to_string();

        assert!(checker.check(&mut state).await.is_err());
        assert_eq!(state.response, "draft");
    }
}
