//! Pipeline observer that turns stage events into structured log records.

use tracing::{debug, info, warn};

use crate::domain::ports::{PipelineObserver, StageEvent};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &StageEvent<'_>) {
        match *event {
            StageEvent::StageStarted { stage, model } => {
                debug!(stage = %stage, model, "stage started");
            }
            StageEvent::StageCompleted {
                stage,
                model,
                elapsed,
            } => {
                info!(
                    stage = %stage,
                    model,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "stage completed"
                );
            }
            StageEvent::StageFailed {
                stage,
                model,
                error,
            } => {
                warn!(
                    stage = %stage,
                    model,
                    error = %error,
                    transient = error.is_transient(),
                    "stage failed"
                );
            }
            StageEvent::TurnCompleted { category, elapsed } => {
                info!(
                    category = %category,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "turn completed"
                );
            }
        }
    }
}
