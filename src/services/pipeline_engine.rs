//! Pipeline Engine
//!
//! Drives one conversation turn through the fixed classifier → router →
//! checker chain, reporting stage boundaries to an observer and committing
//! the turn to history only once every stage has succeeded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::domain::errors::{ModelClientError, PipelineError};
use crate::domain::models::{
    ConversationState, EngineState, PipelineSettings, PromptsConfig, TurnReport,
};
use crate::domain::ports::{
    ChatMessage, ModelClient, NullObserver, PipelineObserver, StageEvent,
};
use crate::services::stages::{Checker, Classifier, KeywordOverride, Router, Stage};

/// Model clients for each pipeline role.
///
/// Roles may share a client; the default configuration uses the same model
/// for classification and checking.
#[derive(Clone)]
pub struct PipelineConfig {
    pub classifier: Arc<dyn ModelClient>,
    pub code: Arc<dyn ModelClient>,
    pub natural_language: Arc<dyn ModelClient>,
    pub checker: Arc<dyn ModelClient>,
}

impl PipelineConfig {
    /// Use one client for every role.
    pub fn uniform(client: Arc<dyn ModelClient>) -> Self {
        Self {
            classifier: client.clone(),
            code: client.clone(),
            natural_language: client.clone(),
            checker: client,
        }
    }
}

/// Successful stage run.
struct StageRun {
    model: String,
}

/// Failed stage run, before it is mapped to a [`PipelineError`].
struct StageFailure {
    model: String,
    error: ModelClientError,
}

/// Executes turns against a [`ConversationState`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use turnstile::domain::models::ConversationState;
/// use turnstile::infrastructure::mock::ScriptedModelClient;
/// use turnstile::services::{PipelineConfig, PipelineEngine};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = Arc::new(ScriptedModelClient::echo("echo"));
/// let engine = PipelineEngine::new(PipelineConfig::uniform(client));
///
/// let mut state = ConversationState::new();
/// let report = engine.invoke(&mut state, "Tell me about Mars").await?;
/// println!("{}", report.response);
/// # Ok(())
/// # }
/// ```
pub struct PipelineEngine {
    clients: PipelineConfig,
    prompts: PromptsConfig,
    keywords: KeywordOverride,
    settings: PipelineSettings,
    observer: Arc<dyn PipelineObserver>,
    classifier: Classifier,
    router: Router,
    checker: Checker,
}

impl PipelineEngine {
    /// Create an engine with default prompts, keywords and settings.
    pub fn new(clients: PipelineConfig) -> Self {
        let prompts = PromptsConfig::default();
        let keywords = KeywordOverride::default();
        let settings = PipelineSettings::default();
        let (classifier, router, checker) = assemble(&clients, &prompts, &keywords, settings);
        Self {
            clients,
            prompts,
            keywords,
            settings,
            observer: Arc::new(NullObserver),
            classifier,
            router,
            checker,
        }
    }

    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptsConfig) -> Self {
        self.prompts = prompts;
        self.rebuild()
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: KeywordOverride) -> Self {
        self.keywords = keywords;
        self.rebuild()
    }

    #[must_use]
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self.rebuild()
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn rebuild(mut self) -> Self {
        let (classifier, router, checker) =
            assemble(&self.clients, &self.prompts, &self.keywords, self.settings);
        self.classifier = classifier;
        self.router = router;
        self.checker = checker;
        self
    }

    /// Start a new turn for `query` and run it.
    pub async fn invoke(
        &self,
        state: &mut ConversationState,
        query: impl Into<String>,
    ) -> Result<TurnReport, PipelineError> {
        state.begin_turn(query);
        self.run_turn(state).await
    }

    /// Run the pipeline over the turn already started in `state`.
    ///
    /// On success the query and final response are appended to history. On
    /// failure history is untouched and `state` reflects the last completed
    /// stage.
    #[instrument(skip(self, state), fields(turn = state.turns() + 1))]
    pub async fn run_turn(
        &self,
        state: &mut ConversationState,
    ) -> Result<TurnReport, PipelineError> {
        let started = Instant::now();
        let mut engine_state = EngineState::Start;

        advance(&mut engine_state, EngineState::Classifying);
        if let Err(failure) = self.run_stage(&self.classifier, state).await {
            advance(&mut engine_state, EngineState::Failed);
            return Err(PipelineError::Classification {
                model: failure.model,
                source: failure.error,
            });
        }

        advance(&mut engine_state, EngineState::Routing);
        let routed_model = match self.run_stage(&self.router, state).await {
            Ok(run) => run.model,
            Err(failure) => {
                advance(&mut engine_state, EngineState::Failed);
                return Err(PipelineError::Routing {
                    model: failure.model,
                    category: state.category,
                    source: failure.error,
                });
            }
        };

        advance(&mut engine_state, EngineState::Checking);
        if let Err(failure) = self.run_stage(&self.checker, state).await {
            advance(&mut engine_state, EngineState::Failed);
            return Err(PipelineError::Check {
                model: failure.model,
                unchecked_response: state.response.clone(),
                source: failure.error,
            });
        }

        advance(&mut engine_state, EngineState::Done);
        state.commit_turn();

        let elapsed = started.elapsed();
        self.observer.on_event(&StageEvent::TurnCompleted {
            category: state.category,
            elapsed,
        });

        Ok(TurnReport {
            category: state.category,
            response: state.response.clone(),
            routed_model,
            elapsed,
        })
    }

    async fn run_stage<S: Stage>(
        &self,
        stage: &S,
        state: &mut ConversationState,
    ) -> Result<StageRun, StageFailure> {
        let kind = stage.kind();
        let client = stage.client_for(state);
        let model = client.model_id().to_string();
        let messages = stage.prompt(state);

        self.observer.on_event(&StageEvent::StageStarted {
            stage: kind,
            model: &model,
        });

        let started = Instant::now();
        match self.invoke_with_deadline(client, &messages).await {
            Ok(reply) => {
                stage.apply(state, &reply);
                self.observer.on_event(&StageEvent::StageCompleted {
                    stage: kind,
                    model: &model,
                    elapsed: started.elapsed(),
                });
                Ok(StageRun { model })
            }
            Err(error) => {
                self.observer.on_event(&StageEvent::StageFailed {
                    stage: kind,
                    model: &model,
                    error: &error,
                });
                Err(StageFailure { model, error })
            }
        }
    }

    async fn invoke_with_deadline(
        &self,
        client: &dyn ModelClient,
        messages: &[ChatMessage],
    ) -> Result<String, ModelClientError> {
        match self.settings.stage_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), client.invoke(messages))
                .await
                .map_err(|_| {
                    warn!(model = client.model_id(), deadline_secs = secs, "stage deadline exceeded");
                    ModelClientError::DeadlineExceeded(secs)
                })?,
            None => client.invoke(messages).await,
        }
    }
}

fn assemble(
    clients: &PipelineConfig,
    prompts: &PromptsConfig,
    keywords: &KeywordOverride,
    settings: PipelineSettings,
) -> (Classifier, Router, Checker) {
    let classifier = Classifier::new(
        clients.classifier.clone(),
        prompts.classifier.clone(),
        keywords.clone(),
    );
    let router = Router::new(
        clients.code.clone(),
        clients.natural_language.clone(),
        prompts.code.clone(),
        prompts.natural_language.clone(),
    )
    .with_history_window(settings.history_window);
    let checker = Checker::new(clients.checker.clone(), prompts.checker.clone())
        .with_history_window(settings.history_window);
    (classifier, router, checker)
}

fn advance(current: &mut EngineState, next: EngineState) {
    debug_assert!(
        current.can_transition_to(next),
        "illegal engine transition {current} -> {next}"
    );
    debug!(from = %current, to = %next, "engine transition");
    *current = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, Message, PipelineStage};
    use crate::infrastructure::mock::ScriptedModelClient;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl PipelineObserver for Recorder {
        fn on_event(&self, event: &StageEvent<'_>) {
            let line = match event {
                StageEvent::StageStarted { stage, model } => format!("start {stage} {model}"),
                StageEvent::StageCompleted { stage, .. } => format!("done {stage}"),
                StageEvent::StageFailed { stage, .. } => format!("fail {stage}"),
                StageEvent::TurnCompleted { category, .. } => format!("turn {category}"),
            };
            self.0.lock().unwrap().push(line);
        }
    }

    struct Clients {
        classifier: Arc<ScriptedModelClient>,
        code: Arc<ScriptedModelClient>,
        natural_language: Arc<ScriptedModelClient>,
        checker: Arc<ScriptedModelClient>,
    }

    impl Clients {
        fn config(&self) -> PipelineConfig {
            PipelineConfig {
                classifier: self.classifier.clone(),
                code: self.code.clone(),
                natural_language: self.natural_language.clone(),
                checker: self.checker.clone(),
            }
        }
    }

    fn clients(label: &str) -> Clients {
        Clients {
            classifier: Arc::new(ScriptedModelClient::new("classifier", [label])),
            code: Arc::new(ScriptedModelClient::new("code", ["code answer"])),
            natural_language: Arc::new(ScriptedModelClient::new("nl", ["nl answer"])),
            checker: Arc::new(ScriptedModelClient::echo("checker")),
        }
    }

    #[tokio::test]
    async fn test_successful_turn_appends_one_pair() {
        let clients = clients("natural_language");
        let engine = PipelineEngine::new(clients.config());
        let mut state = ConversationState::new();

        let report = engine.invoke(&mut state, "Tell me about Mars").await.unwrap();

        assert_eq!(report.category, Category::NaturalLanguage);
        assert_eq!(report.response, "nl answer");
        assert_eq!(report.routed_model, "nl");
        assert_eq!(
            state.history(),
            &[
                Message::user("Tell me about Mars"),
                Message::assistant("nl answer"),
            ]
        );
    }

    #[tokio::test]
    async fn test_observer_sees_stage_boundaries_in_order() {
        let clients = clients("code");
        let recorder = Arc::new(Recorder::default());
        let engine = PipelineEngine::new(clients.config()).with_observer(recorder.clone());
        let mut state = ConversationState::new();

        engine.invoke(&mut state, "sort a list").await.unwrap();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "start classifier classifier",
                "done classifier",
                "start router code",
                "done router",
                "start checker checker",
                "done checker",
                "turn code",
            ]
        );
    }

    #[tokio::test]
    async fn test_checker_failure_exposes_unchecked_response() {
        let mut clients = clients("natural_language");
        clients.checker = Arc::new(ScriptedModelClient::failing(
            "checker",
            ModelClientError::Timeout,
        ));
        let engine = PipelineEngine::new(clients.config());
        let mut state = ConversationState::new();

        let err = engine.invoke(&mut state, "hello").await.unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Checker);
        assert_eq!(err.degraded_response(), Some("nl answer"));
        assert!(state.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_deadline_fails_stage() {
        let mut clients = clients("natural_language");
        clients.natural_language = Arc::new(
            ScriptedModelClient::new("nl", ["late"]).with_delay(Duration::from_secs(30)),
        );
        let engine = PipelineEngine::new(clients.config()).with_settings(PipelineSettings {
            history_window: None,
            stage_timeout_secs: Some(5),
        });
        let mut state = ConversationState::new();

        let err = engine.invoke(&mut state, "hello").await.unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Router);
        assert_eq!(err.client_error(), &ModelClientError::DeadlineExceeded(5));
        assert_eq!(state.category, Category::NaturalLanguage);
        assert!(state.response.is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    #[should_panic(expected = "illegal engine transition")]
    #[cfg(debug_assertions)]
    fn test_skipping_a_stage_is_rejected() {
        let mut state = EngineState::Start;
        advance(&mut state, EngineState::Checking);
    }
}
