//! Turnstile - a routed, self-checking chat assistant for local models
//!
//! Every query passes through a three-stage pipeline served by an Ollama
//! server: a classifier labels the query as code or natural language, the
//! matching specialist model drafts an answer, and a checker model reviews
//! the draft. Completed turns are appended to a JSON transcript.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports and errors
//! - **Service Layer** (`services`): pipeline engine, stages, session loop
//! - **Infrastructure Layer** (`infrastructure`): Ollama client, JSON
//!   transcript store, configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use turnstile::infrastructure::ollama::build_pipeline_config;
//! use turnstile::{Config, ConversationState, PipelineEngine};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = PipelineEngine::new(build_pipeline_config(&config)?);
//!
//! let mut state = ConversationState::new();
//! let report = engine.invoke(&mut state, "Tell me about Mars").await?;
//! println!("[{}] {}", report.category, report.response);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{PersistenceError, PipelineError, SessionError};
pub use domain::models::{
    Category, Config, ConversationState, PersistedTurn, PipelineStage, TurnReport,
};
pub use domain::ports::{ChatMessage, ModelClient, PipelineObserver, TranscriptStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConversationSession, PipelineConfig, PipelineEngine, TranscriptLog};
