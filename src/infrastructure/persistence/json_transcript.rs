//! JSON file transcript store.
//!
//! The file holds a single pretty-printed JSON array of turns. Every save
//! writes a sibling temp file and renames it over the transcript, so a crash
//! mid-write never leaves a truncated file behind.

use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::domain::errors::PersistenceError;
use crate::domain::models::PersistedTurn;
use crate::domain::ports::TranscriptStore;

#[derive(Debug, Clone)]
pub struct JsonTranscriptStore {
    path: PathBuf,
}

impl JsonTranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize with four-space indentation.
pub fn to_pretty_json(turns: &[PersistedTurn]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    turns.serialize(&mut serializer)?;
    Ok(buf)
}

#[async_trait]
impl TranscriptStore for JsonTranscriptStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<PersistedTurn>, PersistenceError> {
        // Raw bytes so invalid UTF-8 is reported as corruption, not I/O
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no transcript yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(io_error(&self.path, err)),
        };

        if contents.trim_ascii().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&contents).map_err(|err| PersistenceError::Corrupt {
            path: self.path.clone(),
            reason: err.to_string(),
        })
    }

    #[instrument(skip(self, turns), fields(path = %self.path.display(), turns = turns.len()))]
    async fn save(&self, turns: &[PersistedTurn]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| io_error(parent, err))?;
        }

        let json = to_pretty_json(turns)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|err| io_error(&temp_path, err))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|err| io_error(&self.path, err))?;

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
