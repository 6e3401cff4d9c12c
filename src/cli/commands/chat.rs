//! Implementation of the `turnstile chat` command.

use anyhow::Result;
use clap::Args;
use console::style;
use futures::Stream;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::output::{output, CommandOutput, SpinnerObserver};
use crate::domain::errors::SessionError;
use crate::domain::models::Config;
use crate::services::{SessionSummary, TurnOutcome};

use super::open_session;

const FIRST_PROMPT: &str = "How can I assist you today?";
const NEXT_PROMPT: &str = "Do you need anything else?";

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Hide the per-stage progress spinners
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatOutput {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub transcript: String,
}

impl CommandOutput for ChatOutput {
    fn to_human(&self) -> String {
        let mut text = format!(
            "\nGoodbye! {} turn(s) this session, chat history saved to {}.",
            self.summary.turns_completed, self.transcript
        );
        if self.summary.turns_unsaved > 0 {
            text.push_str(&format!(
                "\n{} {} turn(s) could not be written to the transcript.",
                style("warning:").yellow(),
                self.summary.turns_unsaved
            ));
        }
        text
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// One line of JSON output per turn
#[derive(Debug, Serialize)]
struct TurnLine<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn execute(args: ChatArgs, config: &Config, json_mode: bool) -> Result<()> {
    let spinner = if json_mode || args.quiet {
        SpinnerObserver::hidden()
    } else {
        SpinnerObserver::new()
    };
    let mut session = open_session(config, Some(Arc::new(spinner))).await?;
    let transcript = session.log().location();

    let queries = stdin_queries(!json_mode);
    let summary = session
        .run(queries, |query, result| {
            if json_mode {
                print_turn_json(query, result);
            } else {
                print_turn(result);
            }
        })
        .await;

    output(
        &ChatOutput {
            summary,
            transcript,
        },
        json_mode,
    );
    Ok(())
}

/// Lines read from stdin, prompting before each read.
fn stdin_queries(show_prompts: bool) -> impl Stream<Item = String> {
    let lines = BufReader::new(tokio::io::stdin()).lines();

    futures::stream::unfold((lines, true), move |(mut lines, first)| async move {
        if show_prompts {
            let prompt = if first { FIRST_PROMPT } else { NEXT_PROMPT };
            print!("\n{}\n> ", style(prompt).bold());
            let _ = std::io::stdout().flush();
        }

        match lines.next_line().await {
            Ok(Some(line)) => Some((line, (lines, false))),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read from stdin");
                None
            }
        }
    })
}

fn print_turn(result: &Result<TurnOutcome, SessionError>) {
    match result {
        Ok(outcome) => {
            for hit in &outcome.glossary_hits {
                println!(
                    "{} {}: {}",
                    style("[glossary]").yellow(),
                    hit.term,
                    hit.definition
                );
            }
            println!("\n{}", outcome.report.response);
        }
        Err(err) => {
            if let Some(response) = err.response() {
                println!("\n{response}");
            }
            eprintln!("{} {err}", style("error:").red().bold());
        }
    }
}

fn print_turn_json(query: &str, result: &Result<TurnOutcome, SessionError>) {
    let line = match result {
        Ok(outcome) => TurnLine {
            query,
            response: Some(&outcome.report.response),
            category: Some(outcome.report.category.to_string()),
            error: None,
        },
        Err(err) => TurnLine {
            query,
            response: err.response(),
            category: None,
            error: Some(err.to_string()),
        },
    };
    println!("{}", serde_json::to_string(&line).unwrap_or_default());
}
