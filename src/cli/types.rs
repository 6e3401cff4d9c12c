//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{ask::AskArgs, chat::ChatArgs, history::HistoryArgs, init::InitArgs};

#[derive(Parser, Debug)]
#[command(name = "turnstile")]
#[command(about = "Turnstile - classify, route and check queries across local Ollama models", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to use instead of .turnstile/config.yaml and local.yaml
    #[arg(short, long, global = true, env = "TURNSTILE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive conversation
    Chat(ChatArgs),

    /// Run a single query through the pipeline
    Ask(AskArgs),

    /// Show the saved transcript
    History(HistoryArgs),

    /// Check that the Ollama server and configured models are available
    Health,

    /// Write the default configuration to .turnstile/config.yaml
    Init(InitArgs),
}
