use async_trait::async_trait;

use crate::domain::errors::PersistenceError;
use crate::domain::models::PersistedTurn;

/// Port for the durable transcript.
///
/// The transcript is always read and written whole: `load` returns every
/// recorded turn in chronological order and `save` replaces the stored
/// sequence with the given one.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Load the stored transcript.
    ///
    /// A store that has never been written returns an empty list.
    /// Unreadable contents are reported as [`PersistenceError::Corrupt`];
    /// deciding whether to recover from that is up to the caller.
    async fn load(&self) -> Result<Vec<PersistedTurn>, PersistenceError>;

    /// Replace the stored transcript with `turns`.
    async fn save(&self, turns: &[PersistedTurn]) -> Result<(), PersistenceError>;

    /// Human-readable location, for logs and CLI output.
    fn location(&self) -> String;
}
