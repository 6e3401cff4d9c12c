//! JSON transcript file behavior through the transcript log

mod common;

use std::sync::Arc;

use turnstile::domain::errors::PersistenceError;
use turnstile::domain::models::PersistedTurn;
use turnstile::infrastructure::mock::InMemoryTranscriptStore;
use turnstile::infrastructure::persistence::JsonTranscriptStore;
use turnstile::{TranscriptLog, TranscriptStore};

fn turns(n: usize) -> Vec<PersistedTurn> {
    (0..n)
        .map(|i| PersistedTurn::new(format!("question {i}"), format!("answer {i}")))
        .collect()
}

#[tokio::test]
async fn test_recorded_turns_reload_in_order() {
    let (_dir, path) = common::temp_transcript();

    let log = TranscriptLog::open(Arc::new(JsonTranscriptStore::new(&path))).await;
    for turn in turns(5) {
        log.record(turn).await.unwrap();
    }

    let reopened = TranscriptLog::open(Arc::new(JsonTranscriptStore::new(&path))).await;
    assert_eq!(reopened.turns().await, turns(5));
}

#[tokio::test]
async fn test_malformed_file_loads_as_empty_transcript() {
    let (_dir, path) = common::temp_transcript();
    std::fs::write(&path, "{not json").unwrap();

    let store = Arc::new(JsonTranscriptStore::new(&path));
    assert!(matches!(
        store.load().await,
        Err(PersistenceError::Corrupt { .. })
    ));

    let log = TranscriptLog::open(store).await;
    assert!(log.is_empty().await);

    // The next write replaces the corrupt file with a valid transcript
    log.record(PersistedTurn::new("hi", "hello")).await.unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    let reloaded: Vec<PersistedTurn> = serde_json::from_str(&contents).unwrap();
    assert_eq!(reloaded, vec![PersistedTurn::new("hi", "hello")]);
}

#[tokio::test]
async fn test_invalid_utf8_file_loads_as_empty_transcript() {
    let (_dir, path) = common::temp_transcript();
    std::fs::write(&path, [0xff, 0xfe, b'[', b']']).unwrap();

    let store = Arc::new(JsonTranscriptStore::new(&path));
    assert!(matches!(
        store.load().await,
        Err(PersistenceError::Corrupt { .. })
    ));

    let log = TranscriptLog::open(store).await;
    assert!(log.is_empty().await);

    log.record(PersistedTurn::new("hi", "hello")).await.unwrap();
    let reloaded: Vec<PersistedTurn> =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(reloaded, vec![PersistedTurn::new("hi", "hello")]);
}

#[tokio::test]
async fn test_unreadable_path_starts_empty() {
    // A directory where the file should be cannot be read as a transcript
    let dir = common::temp_dir();

    let log = TranscriptLog::open(Arc::new(JsonTranscriptStore::new(dir.path()))).await;
    assert!(log.is_empty().await);
}

#[tokio::test]
async fn test_missing_file_and_directory_are_created_on_first_write() {
    let dir = common::temp_dir();
    let path = dir.path().join("nested").join("history.json");

    let log = TranscriptLog::open(Arc::new(JsonTranscriptStore::new(&path))).await;
    assert!(log.is_empty().await);
    assert!(!path.exists());

    log.record(PersistedTurn::new("hi", "hello")).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_write_failure_keeps_turns_until_next_successful_write() {
    let store = Arc::new(InMemoryTranscriptStore::new());
    let log = TranscriptLog::open(store.clone()).await;

    store.set_fail_writes(true);
    assert!(log.record(PersistedTurn::new("q1", "a1")).await.is_err());
    assert_eq!(log.len().await, 1);
    assert!(store.stored().is_empty());

    store.set_fail_writes(false);
    log.record(PersistedTurn::new("q2", "a2")).await.unwrap();
    assert_eq!(
        store.stored(),
        vec![PersistedTurn::new("q1", "a1"), PersistedTurn::new("q2", "a2")]
    );
}
