pub mod config;
pub mod conversation;
pub mod pipeline;
pub mod transcript;

pub use config::{
    ClassifierConfig, Config, GlossaryConfig, LoggingConfig, ModelsConfig, OllamaConfig,
    PipelineSettings, PromptsConfig, RetryConfig, SessionConfig, TranscriptConfig,
};
pub use conversation::{Category, ConversationState, Message, Role};
pub use pipeline::{EngineState, PipelineStage, TurnReport};
pub use transcript::PersistedTurn;
