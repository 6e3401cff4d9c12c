use serde::{Deserialize, Serialize};

/// One completed exchange as written to the transcript file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTurn {
    /// The literal query the user typed
    pub user: String,

    /// The final (checked) response
    pub assistant: String,
}

impl PersistedTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}
