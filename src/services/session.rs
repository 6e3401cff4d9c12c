//! Conversation session: one state, one engine, one transcript log.
//!
//! The session consumes queries from a stream so the core never blocks on
//! terminal input. Each query is run through the pipeline and, on success,
//! persisted before the next query is read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::SessionError;
use crate::domain::models::{ConversationState, PersistedTurn, SessionConfig, TurnReport};
use crate::services::glossary::{Glossary, GlossaryHit};
use crate::services::pipeline_engine::PipelineEngine;
use crate::services::transcript_log::TranscriptLog;

/// Result of one successfully completed and persisted turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub report: TurnReport,
    pub glossary_hits: Vec<GlossaryHit>,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub turns_completed: usize,
    pub turns_failed: usize,
    /// Completed turns whose transcript write failed; included in
    /// `turns_completed`
    pub turns_unsaved: usize,
    /// True when an exit word ended the session rather than end of input
    pub exited: bool,
}

pub struct ConversationSession {
    session_id: Uuid,
    state: ConversationState,
    engine: Arc<PipelineEngine>,
    log: Arc<TranscriptLog>,
    glossary: Glossary,
    exit_words: Vec<String>,
}

impl ConversationSession {
    pub fn new(engine: Arc<PipelineEngine>, log: Arc<TranscriptLog>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: ConversationState::new(),
            engine,
            log,
            glossary: Glossary::default(),
            exit_words: SessionConfig::default().exit_words,
        }
    }

    #[must_use]
    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    #[must_use]
    pub fn with_exit_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exit_words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn log(&self) -> &TranscriptLog {
        &self.log
    }

    /// Whether `input` is one of the exit words, ignoring case and
    /// surrounding whitespace.
    pub fn is_exit_command(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        self.exit_words.iter().any(|w| *w == input)
    }

    /// Run one query through the pipeline and persist the turn.
    ///
    /// A persistence failure still returns the response inside
    /// [`SessionError::Persistence`]; the turn is part of history and of the
    /// in-memory transcript either way.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn handle_query(&mut self, query: &str) -> Result<TurnOutcome, SessionError> {
        let glossary_hits = self.glossary.lookup(query);
        let report = self.engine.invoke(&mut self.state, query).await?;

        self.log
            .record(PersistedTurn::new(query, report.response.clone()))
            .await
            .map_err(|source| SessionError::Persistence {
                response: report.response.clone(),
                source,
            })?;

        Ok(TurnOutcome {
            report,
            glossary_hits,
        })
    }

    /// Consume `queries` until an exit word or the end of the stream.
    ///
    /// `on_turn` receives each query with its result. Failed turns do not end
    /// the session. Blank queries are skipped.
    pub async fn run<S, F>(&mut self, queries: S, mut on_turn: F) -> SessionSummary
    where
        S: Stream<Item = String>,
        F: FnMut(&str, &Result<TurnOutcome, SessionError>),
    {
        let mut summary = SessionSummary {
            session_id: self.session_id,
            started_at: Utc::now(),
            turns_completed: 0,
            turns_failed: 0,
            turns_unsaved: 0,
            exited: false,
        };

        futures::pin_mut!(queries);
        while let Some(query) = queries.next().await {
            if self.is_exit_command(&query) {
                summary.exited = true;
                break;
            }
            let query = query.trim();
            if query.is_empty() {
                continue;
            }

            let result = self.handle_query(query).await;
            match &result {
                Ok(_) => summary.turns_completed += 1,
                Err(SessionError::Persistence { .. }) => {
                    summary.turns_completed += 1;
                    summary.turns_unsaved += 1;
                }
                Err(err) => {
                    warn!(error = %err, "turn failed");
                    summary.turns_failed += 1;
                }
            }
            on_turn(query, &result);
        }

        info!(
            session_id = %summary.session_id,
            completed = summary.turns_completed,
            failed = summary.turns_failed,
            unsaved = summary.turns_unsaved,
            exited = summary.exited,
            duration_secs = (Utc::now() - summary.started_at).num_seconds(),
            "session ended"
        );
        summary
    }
}
