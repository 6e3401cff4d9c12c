use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding project-local configuration and the default transcript
pub const CONFIG_DIR: &str = ".turnstile";

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "TURNSTILE_";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Model name for role '{0}' cannot be empty")]
    EmptyModelName(&'static str),

    #[error("Ollama base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid Ollama timeout_secs: 0. Must be at least 1")]
    InvalidTimeout,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid history_window: 0. Omit it to replay the full history")]
    InvalidHistoryWindow,

    #[error("Invalid stage_timeout_secs: 0. Omit it to disable stage deadlines")]
    InvalidStageTimeout,

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Transcript path cannot be empty")]
    EmptyTranscriptPath,

    #[error("Classifier keyword list contains an empty entry")]
    EmptyKeyword,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .turnstile/config.yaml (project config, created by init)
    /// 3. .turnstile/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TURNSTILE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment([
            Self::project_config_path(),
            PathBuf::from(CONFIG_DIR).join("local.yaml"),
        ])
        .extract()
        .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file in place of the project files.
    ///
    /// Environment variables still take precedence.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Self::figment([path])
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Defaults, then each YAML file in order, then the environment.
    ///
    /// Missing YAML files are skipped.
    pub fn figment<I, P>(files: I) -> Figment
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let figment = files.into_iter().fold(
            Figment::new().merge(Serialized::defaults(Config::default())),
            |figment, file| figment.merge(Yaml::file(file.as_ref())),
        );
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path written by `turnstile init`.
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(CONFIG_DIR).join("config.yaml")
    }

    /// Default configuration rendered as YAML.
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&Config::default()).context("Failed to serialize default config")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        for (role, model) in config.models.roles() {
            if model.trim().is_empty() {
                return Err(ConfigError::EmptyModelName(role));
            }
        }

        if config.ollama.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.ollama.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        if let Some(temperature) = config.ollama.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationFailed(format!(
                    "temperature {temperature} is outside 0.0..=2.0"
                )));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.pipeline.history_window == Some(0) {
            return Err(ConfigError::InvalidHistoryWindow);
        }

        if config.pipeline.stage_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidStageTimeout);
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        if config.transcript.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyTranscriptPath);
        }

        if config
            .classifier
            .keywords
            .iter()
            .any(|keyword| keyword.trim().is_empty())
        {
            return Err(ConfigError::EmptyKeyword);
        }

        Ok(())
    }
}
