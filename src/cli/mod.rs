//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;

pub use types::{Cli, Commands};

use crate::domain::errors::SessionError;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from an explicit file, or from the project hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load().context("Failed to load configuration"),
    }
}

/// Report a command failure and exit with a non-zero status.
///
/// When the failure still carries a usable answer (a degraded checker result
/// or an unsaved turn) that answer is shown as well.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let response = err
        .downcast_ref::<SessionError>()
        .and_then(SessionError::response)
        .map(str::to_string);

    if json_mode {
        let mut body = serde_json::json!({
            "error": format!("{err:#}"),
        });
        if let Some(response) = response {
            body["response"] = serde_json::Value::String(response);
        }
        println!("{body}");
    } else {
        if let Some(response) = response {
            println!("{response}");
        }
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1);
}
