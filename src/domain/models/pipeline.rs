//! Pipeline stage and engine state types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::conversation::Category;

/// One step of the fixed classifier → router → checker chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Classifier,
    Router,
    Checker,
}

impl PipelineStage {
    /// Stages in execution order.
    pub const ORDER: [Self; 3] = [Self::Classifier, Self::Router, Self::Checker];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Classifier => "classifier",
            Self::Router => "router",
            Self::Checker => "checker",
        }
    }

    /// Engine state entered while this stage runs.
    pub const fn engine_state(&self) -> EngineState {
        match self {
            Self::Classifier => EngineState::Classifying,
            Self::Router => EngineState::Routing,
            Self::Checker => EngineState::Checking,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of the per-turn engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Start,
    Classifying,
    Routing,
    Checking,
    Done,
    Failed,
}

impl EngineState {
    /// Successor on stage success. Terminal states have none.
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Classifying),
            Self::Classifying => Some(Self::Routing),
            Self::Routing => Some(Self::Checking),
            Self::Checking => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `to` is a legal transition from this state.
    pub fn can_transition_to(&self, to: Self) -> bool {
        match (self, to) {
            (Self::Classifying | Self::Routing | Self::Checking, Self::Failed) => true,
            (from, to) => from.next() == Some(to),
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::Classifying => "classifying",
            Self::Routing => "routing",
            Self::Checking => "checking",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Summary of a completed turn returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub category: Category,
    /// Final response after the checker stage
    pub response: String,
    /// Model that produced the routed (pre-check) answer
    pub routed_model: String,
    pub elapsed: Duration,
}
