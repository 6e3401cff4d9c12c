//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters implement:
//! - ModelClient: text generation backends (Ollama, test doubles)
//! - TranscriptStore: durable storage of completed turns
//! - PipelineObserver: stage-boundary callbacks (logging, terminal UI)
//!
//! The pipeline services depend only on these traits.

pub mod model_client;
pub mod observer;
pub mod transcript_store;

pub use model_client::{ChatMessage, ChatRole, ModelClient};
pub use observer::{CompositeObserver, NullObserver, PipelineObserver, StageEvent};
pub use transcript_store::TranscriptStore;
