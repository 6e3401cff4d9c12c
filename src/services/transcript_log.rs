//! Durable transcript of completed turns.
//!
//! The log keeps every turn in memory and rewrites the whole transcript
//! through its [`TranscriptStore`] after each record. A failed write is
//! reported, but the turn stays in memory, so the next successful write
//! flushes everything recorded so far.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::domain::errors::PersistenceError;
use crate::domain::models::PersistedTurn;
use crate::domain::ports::TranscriptStore;

pub struct TranscriptLog {
    store: Arc<dyn TranscriptStore>,
    turns: Mutex<Vec<PersistedTurn>>,
}

impl TranscriptLog {
    /// Load the existing transcript.
    ///
    /// A transcript that cannot be read or parsed is logged and treated as
    /// empty; the next record overwrites it.
    #[instrument(skip(store), fields(location = %store.location()))]
    pub async fn open(store: Arc<dyn TranscriptStore>) -> Self {
        let turns = match store.load().await {
            Ok(turns) => turns,
            Err(err @ PersistenceError::Corrupt { .. }) => {
                warn!(error = %err, "discarding unparsable transcript");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "transcript unreadable; starting empty");
                Vec::new()
            }
        };
        debug!(turns = turns.len(), "transcript loaded");

        Self {
            store,
            turns: Mutex::new(turns),
        }
    }

    /// Snapshot of every recorded turn, oldest first.
    pub async fn turns(&self) -> Vec<PersistedTurn> {
        self.turns.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.turns.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.lock().await.is_empty()
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Append `turn` and rewrite the full transcript.
    ///
    /// The lock is held across the write so concurrent records never
    /// interleave partial transcripts.
    pub async fn record(&self, turn: PersistedTurn) -> Result<(), PersistenceError> {
        let mut turns = self.turns.lock().await;
        turns.push(turn);
        if let Err(err) = self.store.save(&turns).await {
            warn!(
                error = %err,
                pending = turns.len(),
                "transcript write failed; turns kept in memory"
            );
            return Err(err);
        }
        debug!(turns = turns.len(), location = %self.store.location(), "transcript saved");
        Ok(())
    }
}
