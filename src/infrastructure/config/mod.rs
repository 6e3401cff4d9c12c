//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - Project YAML files under `.turnstile/`
//! - `TURNSTILE_*` environment variable overrides
//! - Validation of the merged result

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
