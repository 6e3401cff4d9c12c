use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::ModelClientError;
use crate::domain::models::{Category, PipelineStage};

/// Notification emitted by the engine at a stage boundary.
#[derive(Debug, Clone, Copy)]
pub enum StageEvent<'a> {
    StageStarted {
        stage: PipelineStage,
        model: &'a str,
    },
    StageCompleted {
        stage: PipelineStage,
        model: &'a str,
        elapsed: Duration,
    },
    StageFailed {
        stage: PipelineStage,
        model: &'a str,
        error: &'a ModelClientError,
    },
    TurnCompleted {
        category: Category,
        elapsed: Duration,
    },
}

/// Callback invoked by the engine at stage boundaries.
///
/// Observers are never required for correctness; the engine behaves the same
/// with [`NullObserver`]. Calls are made inline on the engine's task, so
/// implementations should return quickly.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &StageEvent<'_>);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn on_event(&self, _event: &StageEvent<'_>) {}
}

/// Fans each event out to several observers, in registration order.
#[derive(Clone, Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_event(&self, event: &StageEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    impl PipelineObserver for Counting {
        fn on_event(&self, _event: &StageEvent<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_composite_fans_out() {
        let first = Arc::new(Counting(AtomicUsize::new(0)));
        let second = Arc::new(Counting(AtomicUsize::new(0)));
        let composite = CompositeObserver::new()
            .with(first.clone())
            .with(second.clone());

        composite.on_event(&StageEvent::StageStarted {
            stage: PipelineStage::Classifier,
            model: "mistral:latest",
        });

        assert_eq!(composite.len(), 2);
        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
    }
}
