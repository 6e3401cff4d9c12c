//! Common test utilities for integration tests
//!
//! Scripted model clients wired into pipeline configurations, and temp
//! directories for transcript files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use turnstile::domain::errors::ModelClientError;
use turnstile::infrastructure::mock::ScriptedModelClient;
use turnstile::PipelineConfig;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// A transcript path inside a fresh temp dir.
pub fn temp_transcript() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("chat_history.json");
    (dir, path)
}

/// Scripted clients for each role, kept so tests can inspect the calls.
pub struct Clients {
    pub classifier: Arc<ScriptedModelClient>,
    pub code: Arc<ScriptedModelClient>,
    pub natural_language: Arc<ScriptedModelClient>,
    pub checker: Arc<ScriptedModelClient>,
}

impl Clients {
    /// Classifier replies with `label`, specialists with fixed answers, and
    /// the checker echoes the draft back.
    pub fn new(label: &str) -> Self {
        Self {
            classifier: Arc::new(ScriptedModelClient::new("mistral:latest", [label; 8])),
            code: Arc::new(ScriptedModelClient::new(
                "codellama:latest",
                ["fn reverse(s: &str) -> String { s.chars().rev().collect() }"; 8],
            )),
            natural_language: Arc::new(ScriptedModelClient::new(
                "phi:latest",
                ["Mars is the fourth planet from the Sun."; 8],
            )),
            checker: Arc::new(ScriptedModelClient::echo("mistral:latest")),
        }
    }

    #[must_use]
    pub fn with_failing_code(mut self, error: ModelClientError) -> Self {
        self.code = Arc::new(ScriptedModelClient::failing("codellama:latest", error));
        self
    }

    #[must_use]
    pub fn with_failing_classifier(mut self, error: ModelClientError) -> Self {
        self.classifier = Arc::new(ScriptedModelClient::failing("mistral:latest", error));
        self
    }

    #[must_use]
    pub fn with_failing_checker(mut self, error: ModelClientError) -> Self {
        self.checker = Arc::new(ScriptedModelClient::failing("mistral:latest", error));
        self
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            classifier: self.classifier.clone(),
            code: self.code.clone(),
            natural_language: self.natural_language.clone(),
            checker: self.checker.clone(),
        }
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
