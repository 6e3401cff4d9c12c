//! Classifier stage: labels the query as code or natural language.
//!
//! The model label is normalized permissively (anything unexpected becomes
//! `natural_language`), then a deterministic keyword override forces `code`
//! whenever the query mentions a programming term. Small local models
//! mislabel often enough that the override always has the last word.

use std::sync::Arc;

use crate::domain::errors::ModelClientError;
use crate::domain::models::config::DEFAULT_CODE_KEYWORDS;
use crate::domain::models::{Category, ConversationState, PipelineStage};
use crate::domain::ports::{ChatMessage, ModelClient};

use super::Stage;

/// Map a raw classifier reply onto a category.
///
/// Trims and lowercases the reply; only the exact labels `code` and
/// `natural_language` are accepted, everything else falls back to
/// [`Category::NaturalLanguage`].
pub fn normalize_label(raw: &str) -> Category {
    match raw.trim().to_lowercase().as_str() {
        "code" => Category::Code,
        _ => Category::NaturalLanguage,
    }
}

/// Case-insensitive substring keyword set that forces [`Category::Code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordOverride {
    keywords: Vec<String>,
}

impl KeywordOverride {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// First keyword contained in `query`, if any.
    pub fn find_match(&self, query: &str) -> Option<&str> {
        let query = query.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| query.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, query: &str) -> bool {
        self.find_match(query).is_some()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Final category: `code` on any keyword hit, otherwise the model's label.
    pub fn apply(&self, query: &str, label: Category) -> Category {
        if self.matches(query) {
            Category::Code
        } else {
            label
        }
    }
}

impl Default for KeywordOverride {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_KEYWORDS)
    }
}

/// Classifier stage.
pub struct Classifier {
    client: Arc<dyn ModelClient>,
    instruction: String,
    keywords: KeywordOverride,
}

impl Classifier {
    pub fn new(
        client: Arc<dyn ModelClient>,
        instruction: impl Into<String>,
        keywords: KeywordOverride,
    ) -> Self {
        Self {
            client,
            instruction: instruction.into(),
            keywords,
        }
    }

    /// Label the current query and write the category into `state`.
    ///
    /// On failure the category is left untouched.
    pub async fn classify(
        &self,
        state: &mut ConversationState,
    ) -> Result<Category, ModelClientError> {
        let reply = self.client.invoke(&self.prompt(state)).await?;
        self.apply(state, &reply);
        Ok(state.category)
    }
}

impl Stage for Classifier {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Classifier
    }

    fn client_for(&self, _state: &ConversationState) -> &dyn ModelClient {
        self.client.as_ref()
    }

    /// Only the instruction and the current query; history is not replayed.
    fn prompt(&self, state: &ConversationState) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.instruction.clone()),
            ChatMessage::user(state.query.clone()),
        ]
    }

    fn apply(&self, state: &mut ConversationState, reply: &str) {
        let label = normalize_label(reply);
        let category = self.keywords.apply(&state.query, label);
        if category != label {
            tracing::debug!(
                label = %label,
                keyword = self.keywords.find_match(&state.query).unwrap_or_default(),
                "keyword override forced code category"
            );
        }
        state.category = category;
    }
}
