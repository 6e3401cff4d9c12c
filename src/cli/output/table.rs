//! Table output formatting for the transcript
//!
//! Renders persisted turns with comfy-table.

use crate::cli::output::truncate;
use crate::domain::models::PersistedTurn;
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

/// Transcript formatter for CLI output
pub struct TranscriptTable {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum characters shown per cell (None = full text)
    max_cell_chars: Option<usize>,
}

impl TranscriptTable {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_cell_chars: Some(120),
        }
    }

    pub fn with_config(use_colors: bool, max_cell_chars: Option<usize>) -> Self {
        Self {
            use_colors,
            max_cell_chars,
        }
    }

    /// Format turns as a table; `first_index` numbers the first row.
    pub fn format_turns(&self, turns: &[PersistedTurn], first_index: usize) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("User").add_attribute(Attribute::Bold),
            Cell::new("Assistant").add_attribute(Attribute::Bold),
        ]);

        for (offset, turn) in turns.iter().enumerate() {
            let user = self.cell_text(&turn.user);
            let user_cell = if self.use_colors {
                Cell::new(user).fg(Color::Cyan)
            } else {
                Cell::new(user)
            };
            table.add_row(vec![
                Cell::new(first_index + offset + 1),
                user_cell,
                Cell::new(self.cell_text(&turn.assistant)),
            ]);
        }

        table.to_string()
    }

    fn cell_text(&self, text: &str) -> String {
        match self.max_cell_chars {
            Some(max) => truncate(text, max),
            None => text.to_string(),
        }
    }
}

impl Default for TranscriptTable {
    fn default() -> Self {
        Self::new()
    }
}

fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    console::colors_enabled()
}
