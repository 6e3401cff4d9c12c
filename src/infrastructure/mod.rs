//! Infrastructure layer module
//!
//! Adapters that satisfy the domain ports, plus process-wide concerns:
//! - Ollama HTTP client
//! - JSON transcript persistence
//! - Configuration management
//! - Logging infrastructure
//! - Scripted test doubles

pub mod config;
pub mod logging;
pub mod mock;
pub mod ollama;
pub mod persistence;
