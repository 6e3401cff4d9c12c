//! Implementation of the `turnstile health` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::ollama::{is_installed, server_client};

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub role: &'static str,
    pub model: String,
    pub installed: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthOutput {
    pub base_url: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub models: Vec<ModelStatus>,
}

impl HealthOutput {
    pub fn healthy(&self) -> bool {
        self.reachable && self.models.iter().all(|m| m.installed)
    }
}

impl CommandOutput for HealthOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.reachable {
            lines.push(format!("{} Ollama reachable at {}", console::style("✓").green(), self.base_url));
        } else {
            lines.push(format!(
                "{} Ollama not reachable at {}{}",
                console::style("✗").red(),
                self.base_url,
                self.error.as_deref().map(|e| format!(": {e}")).unwrap_or_default()
            ));
        }
        for status in &self.models {
            let mark = if status.installed {
                console::style("✓").green()
            } else {
                console::style("✗").red()
            };
            lines.push(format!("  {mark} {:<16} {}", status.role, status.model));
        }
        if self.reachable && !self.healthy() {
            lines.push("\nPull missing models with `ollama pull <model>`.".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let client = server_client(config)?;

    let (reachable, installed, error) = match client.list_models().await {
        Ok(models) => (true, models, None),
        Err(err) => (false, Vec::new(), Some(err.to_string())),
    };

    let models = config
        .models
        .roles()
        .into_iter()
        .map(|(role, model)| ModelStatus {
            role,
            model: model.to_string(),
            installed: reachable && is_installed(&installed, model),
        })
        .collect();

    let output_data = HealthOutput {
        base_url: client.base_url().to_string(),
        reachable,
        error,
        models,
    };
    output(&output_data, json_mode);

    if output_data.healthy() {
        Ok(())
    } else {
        anyhow::bail!("Health check failed")
    }
}
