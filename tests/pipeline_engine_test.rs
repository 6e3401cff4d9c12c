//! End-to-end pipeline scenarios against scripted model clients

mod common;

use std::sync::Arc;

use common::Clients;
use turnstile::domain::errors::{ModelClientError, PipelineError};
use turnstile::domain::models::{
    Category, Message, PersistedTurn, PipelineSettings, PromptsConfig,
};
use turnstile::infrastructure::mock::InMemoryTranscriptStore;
use turnstile::{
    ChatMessage, ConversationSession, ConversationState, PipelineEngine, TranscriptLog,
};

#[tokio::test]
async fn test_code_keyword_overrides_natural_language_label() {
    common::setup_test_logging();
    let clients = Clients::new("natural_language");
    let engine = Arc::new(PipelineEngine::new(clients.pipeline()));
    let store = Arc::new(InMemoryTranscriptStore::new());
    let log = Arc::new(TranscriptLog::open(store.clone()).await);
    let mut session = ConversationSession::new(engine, log);

    let outcome = session
        .handle_query("Write a function to reverse a string")
        .await
        .unwrap();

    assert_eq!(outcome.report.category, Category::Code);
    assert_eq!(clients.code.call_count(), 1);
    assert_eq!(clients.natural_language.call_count(), 0);
    assert_eq!(clients.checker.call_count(), 1);

    let stored = store.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user, "Write a function to reverse a string");
    assert_eq!(stored[0].assistant, outcome.report.response);
}

#[tokio::test]
async fn test_unexpected_label_falls_back_to_natural_language() {
    let clients = Clients::new("banana");
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    let report = engine.invoke(&mut state, "Tell me about Mars").await.unwrap();

    assert_eq!(report.category, Category::NaturalLanguage);
    assert_eq!(report.routed_model, "phi:latest");
    assert_eq!(clients.natural_language.call_count(), 1);
    assert_eq!(clients.code.call_count(), 0);
}

#[tokio::test]
async fn test_successful_turn_appends_query_and_response() {
    let clients = Clients::new("natural_language");
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    engine.invoke(&mut state, "Tell me about Mars").await.unwrap();
    let before = state.history().len();
    let report = engine.invoke(&mut state, "And its moons?").await.unwrap();

    assert_eq!(state.history().len(), before + 2);
    assert_eq!(
        &state.history()[before..],
        &[
            Message::user("And its moons?"),
            Message::assistant(report.response.clone())
        ]
    );
}

#[tokio::test]
async fn test_second_turn_replays_history_to_router() {
    let clients = Clients::new("natural_language");
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    engine.invoke(&mut state, "Tell me about Mars").await.unwrap();
    engine.invoke(&mut state, "And its moons?").await.unwrap();

    let calls = clients.natural_language.calls();
    let second = &calls[1];
    assert!(second.iter().any(|m| m.content == "Tell me about Mars"));
    assert_eq!(second.last().unwrap().content, "And its moons?");
}

#[tokio::test]
async fn test_router_failure_leaves_history_unchanged() {
    let clients = Clients::new("code")
        .with_failing_code(ModelClientError::Server {
            status: 500,
            body: "model crashed".to_string(),
        });
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    let err = engine
        .invoke(&mut state, "Write a python loop")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Routing {
            category: Category::Code,
            ..
        }
    ));
    assert!(state.history().is_empty());
    assert_eq!(state.category, Category::Code);
    assert_eq!(clients.checker.call_count(), 0);
}

#[tokio::test]
async fn test_classifier_failure_leaves_category_unclassified() {
    let clients = Clients::new("code").with_failing_classifier(ModelClientError::Timeout);
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    let err = engine
        .invoke(&mut state, "Tell me about Mars")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Classification { .. }));
    assert_eq!(state.category, Category::Unclassified);
    assert!(state.history().is_empty());
    assert_eq!(clients.natural_language.call_count(), 0);
}

#[tokio::test]
async fn test_checker_failure_exposes_unchecked_response() {
    let clients = Clients::new("natural_language")
        .with_failing_checker(ModelClientError::Transport("connection refused".to_string()));
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    let err = engine
        .invoke(&mut state, "Tell me about Mars")
        .await
        .unwrap_err();

    assert_eq!(
        err.degraded_response(),
        Some("Mars is the fourth planet from the Sun.")
    );
    assert!(state.history().is_empty());
}

#[tokio::test]
async fn test_failed_turn_is_not_persisted() {
    let clients = Clients::new("code").with_failing_code(ModelClientError::Timeout);
    let engine = Arc::new(PipelineEngine::new(clients.pipeline()));
    let store = Arc::new(InMemoryTranscriptStore::with_turns(vec![PersistedTurn::new(
        "earlier", "answer",
    )]));
    let log = Arc::new(TranscriptLog::open(store.clone()).await);
    let mut session = ConversationSession::new(engine, log);

    assert!(session.handle_query("Write a python loop").await.is_err());
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.stored().len(), 1);
}

#[tokio::test]
async fn test_checker_sees_history_then_query_and_draft() {
    let clients = Clients::new("natural_language");
    let engine = PipelineEngine::new(clients.pipeline());
    let mut state = ConversationState::new();

    let first = engine.invoke(&mut state, "Tell me about Mars").await.unwrap();
    engine.invoke(&mut state, "And its moons?").await.unwrap();

    let calls = clients.checker.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        vec![
            ChatMessage::system(PromptsConfig::default().checker),
            ChatMessage::user("Tell me about Mars"),
            ChatMessage::assistant(first.response),
            ChatMessage::user("And its moons?"),
            ChatMessage::assistant("Mars is the fourth planet from the Sun."),
        ]
    );
}

#[tokio::test]
async fn test_history_window_limits_router_and_checker_context() {
    let clients = Clients::new("natural_language");
    let engine = PipelineEngine::new(clients.pipeline()).with_settings(PipelineSettings {
        history_window: Some(2),
        ..PipelineSettings::default()
    });
    let mut state = ConversationState::new();

    for query in ["first", "second", "third"] {
        engine.invoke(&mut state, query).await.unwrap();
    }

    // Only the most recent pair is replayed on the third turn
    let answer = "Mars is the fourth planet from the Sun.";
    let router_call = &clients.natural_language.calls()[2];
    assert_eq!(
        router_call[1..],
        [
            ChatMessage::user("second"),
            ChatMessage::assistant(answer),
            ChatMessage::user("third"),
        ]
    );
    let checker_call = &clients.checker.calls()[2];
    assert_eq!(
        checker_call[1..],
        [
            ChatMessage::user("second"),
            ChatMessage::assistant(answer),
            ChatMessage::user("third"),
            ChatMessage::assistant(answer),
        ]
    );
    assert_eq!(state.history().len(), 6);
}
