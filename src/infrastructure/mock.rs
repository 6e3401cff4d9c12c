//! Scripted model client and in-memory transcript store for testing

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::errors::{ModelClientError, PersistenceError};
use crate::domain::models::PersistedTurn;
use crate::domain::ports::{ChatMessage, ModelClient, TranscriptStore};

enum Script {
    /// Pop replies in order; fail with `Transport` once exhausted
    Replies(Mutex<VecDeque<Result<String, ModelClientError>>>),
    /// Return the content of the last message unchanged
    Echo,
    /// Always fail with the same error
    Fail(ModelClientError),
}

/// Model client that answers from a script and records every request.
pub struct ScriptedModelClient {
    model: String,
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModelClient {
    /// Reply with each of `replies` in turn.
    pub fn new<I, S>(model: impl Into<String>, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = replies.into_iter().map(|r| Ok(r.into())).collect();
        Self::with_script(model, Script::Replies(Mutex::new(replies)))
    }

    /// Reply with a mix of successes and failures, in order.
    pub fn with_results(
        model: impl Into<String>,
        results: impl IntoIterator<Item = Result<String, ModelClientError>>,
    ) -> Self {
        Self::with_script(
            model,
            Script::Replies(Mutex::new(results.into_iter().collect())),
        )
    }

    /// Reply with the content of the last message received.
    pub fn echo(model: impl Into<String>) -> Self {
        Self::with_script(model, Script::Echo)
    }

    /// Fail every call with `error`.
    pub fn failing(model: impl Into<String>, error: ModelClientError) -> Self {
        Self::with_script(model, Script::Fail(error))
    }

    fn with_script(model: impl Into<String>, script: Script) -> Self {
        Self {
            model: model.into(),
            script,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering each call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message sequence received so far.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelClientError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Replies(replies) => replies
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front())
                .unwrap_or_else(|| {
                    Err(ModelClientError::Transport(format!(
                        "no scripted reply left for {}",
                        self.model
                    )))
                }),
            Script::Echo => Ok(messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default()),
            Script::Fail(error) => Err(error.clone()),
        }
    }
}

/// Transcript store kept in memory, with switchable write failures.
#[derive(Default)]
pub struct InMemoryTranscriptStore {
    turns: Mutex<Vec<PersistedTurn>>,
    fail_writes: AtomicBool,
    corrupt: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_turns(turns: Vec<PersistedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns),
            ..Self::default()
        }
    }

    /// A store whose contents cannot be parsed.
    pub fn corrupt() -> Self {
        let store = Self::default();
        store.corrupt.store(true, Ordering::SeqCst);
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Contents as of the last successful save.
    pub fn stored(&self) -> Vec<PersistedTurn> {
        self.turns.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn load(&self) -> Result<Vec<PersistedTurn>, PersistenceError> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(PersistenceError::Corrupt {
                path: self.location().into(),
                reason: "scripted corruption".to_string(),
            });
        }
        Ok(self.stored())
    }

    async fn save(&self, turns: &[PersistedTurn]) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io {
                path: self.location().into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        if let Ok(mut stored) = self.turns.lock() {
            *stored = turns.to_vec();
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order_then_fail() {
        let client = ScriptedModelClient::new("m", ["one", "two"]);
        assert_eq!(client.invoke(&[]).await.unwrap(), "one");
        assert_eq!(client.invoke(&[]).await.unwrap(), "two");
        assert!(client.invoke(&[]).await.is_err());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_echo_returns_last_message() {
        let client = ScriptedModelClient::echo("m");
        let reply = client
            .invoke(&[ChatMessage::system("s"), ChatMessage::assistant("draft")])
            .await
            .unwrap();
        assert_eq!(reply, "draft");
    }

    #[tokio::test]
    async fn test_in_memory_store_write_failure() {
        let store = InMemoryTranscriptStore::new();
        store.set_fail_writes(true);
        assert!(store.save(&[PersistedTurn::new("q", "a")]).await.is_err());
        assert!(store.stored().is_empty());

        store.set_fail_writes(false);
        store.save(&[PersistedTurn::new("q", "a")]).await.unwrap();
        assert_eq!(store.stored().len(), 1);
        assert_eq!(store.save_count(), 1);
    }
}
