//! Wire types for the Ollama HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::ports::ChatMessage;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    /// Always false; replies are read as a single JSON object
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Non-streaming reply from `POST /api/chat`
///
/// Durations are reported by the server in nanoseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    pub message: ResponseMessage,
    #[serde(default)]
    pub done: bool,
    pub total_duration: Option<u64>,
    pub load_duration: Option<u64>,
    pub prompt_eval_count: Option<u64>,
    pub eval_count: Option<u64>,
    pub eval_duration: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

impl ChatResponse {
    /// Generation speed in tokens per second, when the server reported it.
    pub fn tokens_per_second(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration) {
            (Some(count), Some(duration)) if duration > 0 => {
                Some(count as f64 / (duration as f64 / 1e9))
            }
            _ => None,
        }
    }
}

/// Reply from `GET /api/tags`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// One installed model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// Whether `wanted` names an installed model.
///
/// A bare name matches its `:latest` tag, as the Ollama CLI resolves it.
pub fn is_installed(installed: &[ModelInfo], wanted: &str) -> bool {
    installed.iter().any(|model| {
        model.name == wanted
            || (!wanted.contains(':') && model.name == format!("{wanted}:latest"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "phi:latest",
            messages: &messages,
            stream: false,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "phi:latest",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn test_response_with_stats() {
        let body = r#"{
            "model": "phi:latest",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "Hello"},
            "done": true,
            "total_duration": 2000000000,
            "eval_count": 50,
            "eval_duration": 1000000000
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.message.content, "Hello");
        assert_eq!(response.tokens_per_second(), Some(50.0));
        assert_eq!(response.load_duration, None);
    }

    #[test]
    fn test_is_installed_resolves_latest_tag() {
        let installed = vec![ModelInfo {
            name: "phi:latest".to_string(),
            size: None,
            modified_at: None,
        }];
        assert!(is_installed(&installed, "phi:latest"));
        assert!(is_installed(&installed, "phi"));
        assert!(!is_installed(&installed, "phi:2.7b"));
        assert!(!is_installed(&installed, "mistral"));
    }
}
