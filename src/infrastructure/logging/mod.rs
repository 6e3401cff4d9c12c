//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty formatting on stderr
//! - Optional rolling JSON log files
//! - A pipeline observer that logs stage boundaries

pub mod config;
pub mod logger;
pub mod observer;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use observer::TracingObserver;
