//! Implementation of the `turnstile history` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TranscriptTable};
use crate::domain::models::{Config, PersistedTurn};

use super::open_transcript;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Show only the most recent N turns
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub transcript: String,
    pub total: usize,
    /// Index of the first shown turn within the full transcript
    #[serde(skip)]
    pub offset: usize,
    pub turns: Vec<PersistedTurn>,
}

impl HistoryOutput {
    /// Keep the last `limit` turns.
    pub fn new(transcript: String, turns: Vec<PersistedTurn>, limit: Option<usize>) -> Self {
        let total = turns.len();
        let offset = limit.map_or(0, |limit| total.saturating_sub(limit));
        Self {
            transcript,
            total,
            offset,
            turns: turns.into_iter().skip(offset).collect(),
        }
    }
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        if self.total == 0 {
            return format!("No turns recorded in {}.", self.transcript);
        }
        let table = TranscriptTable::new().format_turns(&self.turns, self.offset);
        format!(
            "{} of {} turn(s) from {}:\n{}",
            self.turns.len(),
            self.total,
            self.transcript,
            table
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: HistoryArgs, config: &Config, json_mode: bool) -> Result<()> {
    let log = open_transcript(config).await;
    let output_data = HistoryOutput::new(log.location(), log.turns().await, args.limit);
    output(&output_data, json_mode);
    Ok(())
}
