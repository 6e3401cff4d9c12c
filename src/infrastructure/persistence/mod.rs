//! Transcript persistence adapters.

pub mod json_transcript;

pub use json_transcript::{to_pretty_json, JsonTranscriptStore};
