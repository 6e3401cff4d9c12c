use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use super::client::{build_http_client, OllamaClient};
use super::retry::RetryPolicy;
use crate::domain::models::Config;
use crate::domain::ports::ModelClient;
use crate::services::PipelineConfig;

/// Build the four role clients from configuration.
///
/// Roles configured with the same model name share one client, and every
/// client shares a single connection pool.
pub fn build_pipeline_config(config: &Config) -> Result<PipelineConfig> {
    let http_client = build_http_client(&config.ollama)?;
    let retry_policy = RetryPolicy::from(&config.retry);
    let mut clients: HashMap<String, Arc<dyn ModelClient>> = HashMap::new();

    let mut client_for = |model: &str| -> Arc<dyn ModelClient> {
        clients
            .entry(model.to_string())
            .or_insert_with(|| {
                Arc::new(OllamaClient::with_http_client(
                    http_client.clone(),
                    model,
                    &config.ollama,
                    retry_policy.clone(),
                ))
            })
            .clone()
    };

    let models = &config.models;
    Ok(PipelineConfig {
        classifier: client_for(&models.classifier),
        code: client_for(&models.code),
        natural_language: client_for(&models.natural_language),
        checker: client_for(&models.checker),
    })
}

/// A client for server-level calls such as listing models.
pub fn server_client(config: &Config) -> Result<OllamaClient> {
    OllamaClient::new(
        config.models.classifier.as_str(),
        &config.ollama,
        RetryPolicy::none(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_with_same_model_share_a_client() {
        let config = Config::default();
        let pipeline = build_pipeline_config(&config).unwrap();

        assert_eq!(pipeline.classifier.model_id(), "mistral:latest");
        assert_eq!(pipeline.code.model_id(), "codellama:latest");
        assert_eq!(pipeline.natural_language.model_id(), "phi:latest");
        assert!(Arc::ptr_eq(&pipeline.classifier, &pipeline.checker));
        assert!(!Arc::ptr_eq(&pipeline.classifier, &pipeline.code));
    }
}
