//! Conversation state threaded through the pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Routing label written by the classifier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Programming questions, answered by the code model
    Code,
    /// Everything else, answered by the general-knowledge model
    NaturalLanguage,
    /// No classification has been recorded for the current turn
    #[default]
    Unclassified,
}

impl Category {
    /// Wire label used in classifier prompts and replies.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::NaturalLanguage => "natural_language",
            Self::Unclassified => "unclassified",
        }
    }

    pub const fn is_code(&self) -> bool {
        matches!(self, Self::Code)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "natural_language" => Ok(Self::NaturalLanguage),
            "unclassified" => Ok(Self::Unclassified),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Author of a message kept in conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Mutable record carried through one pipeline invocation.
///
/// `history` only ever grows, and only by whole user/assistant pairs appended
/// once a turn completes. `category` and `response` are per-turn and are reset
/// by [`ConversationState::begin_turn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub query: String,
    pub category: Category,
    pub response: String,
    history: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state whose history was recorded elsewhere.
    ///
    /// Returns `None` when the history does not consist of alternating
    /// user/assistant pairs.
    pub fn with_history(history: Vec<Message>) -> Option<Self> {
        let well_formed = history.len() % 2 == 0
            && history.chunks(2).all(|pair| {
                pair[0].role == Role::User && pair[1].role == Role::Assistant
            });

        well_formed.then(|| Self {
            history,
            ..Self::default()
        })
    }

    /// Set the query for a new turn and clear the per-turn fields.
    pub fn begin_turn(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.category = Category::Unclassified;
        self.response.clear();
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of completed turns held in history.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    /// Append the current query/response pair to history.
    ///
    /// Only the pipeline engine calls this, once per completed turn.
    pub(crate) fn commit_turn(&mut self) {
        self.history.push(Message::user(self.query.clone()));
        self.history.push(Message::assistant(self.response.clone()));
    }
}
