//! Domain layer for the Turnstile conversation pipeline
//!
//! This module contains the conversation and transcript models, the error
//! taxonomy, and the port traits the services are written against.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{ModelClientError, PersistenceError, PipelineError, SessionError};
