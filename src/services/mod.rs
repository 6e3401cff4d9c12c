//! Service layer: the pipeline stages, the engine that drives them, and the
//! session that feeds it queries and persists the results.

pub mod context_window;
pub mod glossary;
pub mod pipeline_engine;
pub mod session;
pub mod stages;
pub mod transcript_log;

pub use glossary::{Glossary, GlossaryHit};
pub use pipeline_engine::{PipelineConfig, PipelineEngine};
pub use session::{ConversationSession, SessionSummary, TurnOutcome};
pub use stages::{normalize_label, Checker, Classifier, KeywordOverride, Router, Stage};
pub use transcript_log::TranscriptLog;
