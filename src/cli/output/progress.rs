//! Spinner utilities using indicatif for terminal output
//!
//! Spinners draw to stderr, so they never mix with answers on stdout.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::ports::{PipelineObserver, StageEvent};

const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} [{elapsed}]";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";

/// Create a spinner for indeterminate operations
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("✓").green(), message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", console::style("✗").red(), message.into()));
    }
}

/// Pipeline observer showing one spinner line per stage.
pub struct SpinnerObserver {
    current: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl SpinnerObserver {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            hidden: false,
        }
    }

    /// Observer that tracks stages without drawing (JSON mode, tests).
    pub fn hidden() -> Self {
        Self {
            current: Mutex::new(None),
            hidden: true,
        }
    }

    fn start(&self, message: String) {
        let spinner = if self.hidden {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::hidden());
            spinner
        } else {
            create_spinner()
        };
        spinner.set_message(message);
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    fn finish(&self, message: String, success: bool) {
        let Some(spinner) = self.current.lock().ok().and_then(|mut c| c.take()) else {
            return;
        };
        if success {
            spinner.finish_success(message);
        } else {
            spinner.finish_error(message);
        }
    }

    /// Whether a stage spinner is still running.
    pub fn is_active(&self) -> bool {
        self.current.lock().map(|c| c.is_some()).unwrap_or(false)
    }
}

impl Default for SpinnerObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for SpinnerObserver {
    fn on_event(&self, event: &StageEvent<'_>) {
        match *event {
            StageEvent::StageStarted { stage, model } => {
                self.start(format!("{stage} ({model})"));
            }
            StageEvent::StageCompleted {
                stage,
                model,
                elapsed,
            } => {
                self.finish(
                    format!("{stage} ({model}) {:.1}s", elapsed.as_secs_f64()),
                    true,
                );
            }
            StageEvent::StageFailed {
                stage,
                model,
                error,
            } => {
                self.finish(format!("{stage} ({model}): {error}"), false);
            }
            StageEvent::TurnCompleted { .. } => {}
        }
    }
}
