//! Ollama HTTP adapter for the [`ModelClient`](crate::domain::ports::ModelClient) port.

pub mod client;
pub mod errors;
pub mod factory;
pub mod retry;
pub mod types;

pub use client::{build_http_client, OllamaClient};
pub use errors::OllamaError;
pub use factory::{build_pipeline_config, server_client};
pub use retry::RetryPolicy;
pub use types::{is_installed, ModelInfo};
