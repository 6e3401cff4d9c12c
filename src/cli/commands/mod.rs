//! CLI command implementations.

pub mod ask;
pub mod chat;
pub mod health;
pub mod history;
pub mod init;

use anyhow::Result;
use std::sync::Arc;

use crate::domain::models::Config;
use crate::domain::ports::{CompositeObserver, PipelineObserver};
use crate::infrastructure::logging::TracingObserver;
use crate::infrastructure::ollama::build_pipeline_config;
use crate::infrastructure::persistence::JsonTranscriptStore;
use crate::services::{
    ConversationSession, Glossary, KeywordOverride, PipelineEngine, TranscriptLog,
};

/// Open the configured transcript.
pub(crate) async fn open_transcript(config: &Config) -> TranscriptLog {
    let store = Arc::new(JsonTranscriptStore::new(&config.transcript.path));
    TranscriptLog::open(store).await
}

/// Build a session wired to Ollama and the JSON transcript.
///
/// `observer` receives stage events alongside the tracing observer.
pub(crate) async fn open_session(
    config: &Config,
    observer: Option<Arc<dyn PipelineObserver>>,
) -> Result<ConversationSession> {
    let mut observers = CompositeObserver::new().with(Arc::new(TracingObserver));
    if let Some(observer) = observer {
        observers = observers.with(observer);
    }

    let engine = PipelineEngine::new(build_pipeline_config(config)?)
        .with_prompts(config.prompts.clone())
        .with_keywords(KeywordOverride::new(&config.classifier.keywords))
        .with_settings(config.pipeline)
        .with_observer(Arc::new(observers));

    let log = open_transcript(config).await;

    Ok(ConversationSession::new(Arc::new(engine), Arc::new(log))
        .with_glossary(Glossary::from_config(&config.glossary))
        .with_exit_words(&config.session.exit_words))
}
