use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for Turnstile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Ollama server connection
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Model name per pipeline role
    #[serde(default)]
    pub models: ModelsConfig,

    /// System instructions per pipeline role
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Classifier keyword override
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Engine tuning
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Transcript persistence
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Interactive session behaviour
    #[serde(default)]
    pub session: SessionConfig,

    /// Known-term definitions shown alongside answers
    #[serde(default)]
    pub glossary: GlossaryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retry policy for model calls
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature passed to every model (server default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

/// Model names used for each pipeline role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelsConfig {
    #[serde(default = "default_classifier_model")]
    pub classifier: String,

    #[serde(default = "default_code_model")]
    pub code: String,

    #[serde(default = "default_natural_language_model")]
    pub natural_language: String,

    #[serde(default = "default_checker_model")]
    pub checker: String,
}

fn default_classifier_model() -> String {
    "mistral:latest".to_string()
}

fn default_code_model() -> String {
    "codellama:latest".to_string()
}

fn default_natural_language_model() -> String {
    "phi:latest".to_string()
}

fn default_checker_model() -> String {
    "mistral:latest".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classifier: default_classifier_model(),
            code: default_code_model(),
            natural_language: default_natural_language_model(),
            checker: default_checker_model(),
        }
    }
}

impl ModelsConfig {
    /// All configured model names with their role, in pipeline order.
    pub fn roles(&self) -> [(&'static str, &str); 4] {
        [
            ("classifier", self.classifier.as_str()),
            ("code", self.code.as_str()),
            ("natural_language", self.natural_language.as_str()),
            ("checker", self.checker.as_str()),
        ]
    }
}

/// System instructions for each stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromptsConfig {
    #[serde(default = "default_classifier_prompt")]
    pub classifier: String,

    #[serde(default = "default_code_prompt")]
    pub code: String,

    #[serde(default = "default_natural_language_prompt")]
    pub natural_language: String,

    #[serde(default = "default_checker_prompt")]
    pub checker: String,
}

fn default_classifier_prompt() -> String {
    r#"You are a classifier that determines whether a user's query is about 'code' or 'natural_language'.

Rules:
- If the query contains programming-related words such as Python, JavaScript, Java, C++, C#, SQL, database, algorithm, function, loop, debugging, API, programming, or coding, classify it as: code.
- If the query is about history, science, music, language, daily life, or general topics, classify it as: natural_language.
- ONLY return one word: "code" or "natural_language". Do not add explanations.

Examples:
- "How do I write a function in Python?" -> code
- "Explain recursion in JavaScript." -> code
- "What is the Big Bang Theory?" -> natural_language
- "Tell me about the history of Rome." -> natural_language
- "How do I debug a Python script?" -> code
- "How does gravity work?" -> natural_language
- "Write a SQL query to join two tables." -> code
- "How do I play the guitar?" -> natural_language"#
        .to_string()
}

fn default_code_prompt() -> String {
    "You are an AI code assistant. Answer programming questions concisely with examples when necessary.
- Provide clear explanations with code snippets.
- If asked to debug, explain errors and suggest fixes.
- For SQL queries, ensure correct syntax and optimization."
        .to_string()
}

fn default_natural_language_prompt() -> String {
    "You are an AI that answers general knowledge questions clearly and concisely.
- Provide well-structured explanations.
- If answering historical or scientific questions, use reliable knowledge."
        .to_string()
}

fn default_checker_prompt() -> String {
    "You are a response checker. Read the given response and check if it needs improvement.
If so, improve it. If the response is already good, return it unchanged."
        .to_string()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            classifier: default_classifier_prompt(),
            code: default_code_prompt(),
            natural_language: default_natural_language_prompt(),
            checker: default_checker_prompt(),
        }
    }
}

/// Deterministic keyword override applied after model classification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassifierConfig {
    /// Case-insensitive substrings that force the `code` category
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

/// Default override keywords.
pub const DEFAULT_CODE_KEYWORDS: [&str; 17] = [
    "python",
    "java",
    "c++",
    "c#",
    "javascript",
    "sql",
    "database",
    "algorithm",
    "function",
    "loop",
    "debugging",
    "api",
    "class",
    "object",
    "variable",
    "programming",
    "coding",
];

fn default_keywords() -> Vec<String> {
    DEFAULT_CODE_KEYWORDS.iter().map(ToString::to_string).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

/// Engine tuning knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineSettings {
    /// Maximum number of history messages replayed to the router and checker.
    /// Rounded down to whole user/assistant pairs. Full history when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,

    /// Deadline for each stage's model call in seconds. No deadline when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_timeout_secs: Option<u64>,
}

/// Transcript file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TranscriptConfig {
    /// Path of the JSON transcript file
    #[serde(default = "default_transcript_path")]
    pub path: PathBuf,
}

fn default_transcript_path() -> PathBuf {
    PathBuf::from(".turnstile/chat_history.json")
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            path: default_transcript_path(),
        }
    }
}

/// Interactive session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Inputs that end the session (case-insensitive)
    #[serde(default = "default_exit_words")]
    pub exit_words: Vec<String>,
}

fn default_exit_words() -> Vec<String> {
    vec!["exit".to_string(), "quit".to_string(), "bye".to_string()]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exit_words: default_exit_words(),
        }
    }
}

/// Glossary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GlossaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Term → definition
    #[serde(default = "default_glossary_entries")]
    pub entries: BTreeMap<String, String>,
}

const fn default_true() -> bool {
    true
}

fn default_glossary_entries() -> BTreeMap<String, String> {
    [
        (
            "qubit",
            "A qubit is the basic unit of quantum information in a quantum computer.",
        ),
        (
            "blockchain",
            "Blockchain is a decentralized ledger technology that records transactions securely.",
        ),
        (
            "GAN",
            "A Generative Adversarial Network (GAN) is a deep learning model used for generating realistic data.",
        ),
        (
            "entropy",
            "In information theory, entropy represents the unpredictability of data.",
        ),
        ("WAWAWA", "Wawawa is a placeholder word with no specific meaning."),
    ]
    .into_iter()
    .map(|(term, definition)| (term.to_string(), definition.to_string()))
    .collect()
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            entries: default_glossary_entries(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 disables retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
