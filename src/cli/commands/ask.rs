//! Implementation of the `turnstile ask` command.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use crate::cli::output::{output, CommandOutput, SpinnerObserver};
use crate::domain::errors::SessionError;
use crate::domain::models::{Category, Config};
use crate::services::GlossaryHit;

use super::open_session;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The query to send (multiple words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub query: String,
    pub category: Category,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routed_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    pub glossary: Vec<GlossaryHit>,
    pub transcript: String,
    /// Set when the answer could not be saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for hit in &self.glossary {
            lines.push(format!(
                "{} {}: {}",
                console::style("[glossary]").yellow(),
                hit.term,
                hit.definition
            ));
        }
        lines.push(self.response.clone());
        if let Some(warning) = &self.warning {
            lines.push(format!("\n{} {warning}", console::style("warning:").yellow()));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: AskArgs, config: &Config, json_mode: bool) -> Result<()> {
    let query = args.query.join(" ").trim().to_string();
    if query.is_empty() {
        return Err(anyhow!("Query cannot be empty"));
    }

    let spinner = if json_mode {
        SpinnerObserver::hidden()
    } else {
        SpinnerObserver::new()
    };
    let mut session = open_session(config, Some(Arc::new(spinner))).await?;
    let transcript = session.log().location();

    let output_data = match session.handle_query(&query).await {
        Ok(outcome) => AskOutput {
            query,
            category: outcome.report.category,
            response: outcome.report.response,
            routed_model: Some(outcome.report.routed_model),
            elapsed_ms: Some(outcome.report.elapsed.as_millis() as u64),
            glossary: outcome.glossary_hits,
            transcript,
            warning: None,
        },
        // The turn completed; only the transcript write failed
        Err(SessionError::Persistence { response, source }) => AskOutput {
            category: session.state().category,
            glossary: session.glossary().lookup(&query),
            query,
            response,
            routed_model: None,
            elapsed_ms: None,
            transcript,
            warning: Some(source.to_string()),
        },
        Err(err) => return Err(err.into()),
    };

    output(&output_data, json_mode);
    Ok(())
}
