use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::errors::OllamaError;
use super::retry::RetryPolicy;
use super::types::{ChatOptions, ChatRequest, ChatResponse, ModelInfo, TagsResponse};
use crate::domain::errors::ModelClientError;
use crate::domain::models::OllamaConfig;
use crate::domain::ports::{ChatMessage, ModelClient};

/// Build the shared HTTP client used for every model role.
///
/// reqwest clients pool connections internally and are cheap to clone, so
/// one client serves all four roles.
pub fn build_http_client(config: &OllamaConfig) -> Result<ReqwestClient> {
    ReqwestClient::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(4)
        .tcp_nodelay(true)
        .build()
        .context("Failed to build HTTP client")
}

/// [`ModelClient`] backed by one model on an Ollama server
///
/// Each call is a single non-streaming `POST /api/chat`. Transient failures
/// are retried according to the configured [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    options: Option<ChatOptions>,
    retry_policy: RetryPolicy,
}

impl OllamaClient {
    /// Create a client with its own connection pool.
    pub fn new(
        model: impl Into<String>,
        config: &OllamaConfig,
        retry_policy: RetryPolicy,
    ) -> Result<Self> {
        let http_client = build_http_client(config)?;
        Ok(Self::with_http_client(
            http_client,
            model,
            config,
            retry_policy,
        ))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_http_client(
        http_client: ReqwestClient,
        model: impl Into<String>,
        config: &OllamaConfig,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            options: config
                .temperature
                .map(|temperature| ChatOptions {
                    temperature: Some(temperature),
                }),
            retry_policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `messages` and return the reply text.
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, OllamaError> {
        let response = self
            .retry_policy
            .execute(|| self.send_chat(messages))
            .await?;

        debug!(
            model = %response.model,
            done = response.done,
            total_ms = response.total_duration.map(|ns| ns / 1_000_000),
            load_ms = response.load_duration.map(|ns| ns / 1_000_000),
            prompt_tokens = response.prompt_eval_count,
            eval_tokens = response.eval_count,
            tokens_per_second = response.tokens_per_second(),
            "chat completed"
        );

        Ok(response.message.content)
    }

    async fn send_chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, OllamaError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: self.options,
        };

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OllamaError::from_status(status, body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Models installed on the server.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, OllamaError> {
        let response = self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OllamaError::from_status(status, body));
        }

        let tags: TagsResponse = serde_json::from_str(&body)?;
        debug!(models = tags.models.len(), "listed installed models");
        Ok(tags.models)
    }

    /// Whether the server answers at all.
    pub async fn health_check(&self) -> Result<bool, OllamaError> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(err) if err.is_transient() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ModelClientError> {
        self.chat(messages).await.map_err(ModelClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = OllamaConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..OllamaConfig::default()
        };
        let client = OllamaClient::new("phi:latest", &config, RetryPolicy::none()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model_id(), "phi:latest");
    }

    #[test]
    fn test_temperature_becomes_options() {
        let config = OllamaConfig {
            temperature: Some(0.3),
            ..OllamaConfig::default()
        };
        let client = OllamaClient::new("phi:latest", &config, RetryPolicy::none()).unwrap();
        assert_eq!(
            client.options,
            Some(ChatOptions {
                temperature: Some(0.3)
            })
        );
    }
}
