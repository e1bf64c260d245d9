//! Chat-completions backend for OpenAI-compatible endpoints

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::{build_prompt, ReasoningBackend, WindowRequest};
use crate::error::{ReconcileError, ReconcileResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 20_000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings for [`OpenAiBackend`]
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub max_completion_tokens: u32,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            max_completion_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpenAiConfig {
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = api_key.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking chat-completions client
pub struct OpenAiBackend {
    client: reqwest::blocking::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Build a client; fails when no API key is configured
    pub fn new(config: OpenAiConfig) -> ReconcileResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ReconcileError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

impl ReasoningBackend for OpenAiBackend {
    fn propose(&mut self, request: &WindowRequest<'_>) -> ReconcileResult<String> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_completion_tokens: self.config.max_completion_tokens,
        };

        tracing::debug!(
            model = %self.config.model,
            row_start = request.window.start,
            row_end = request.window.end,
            prompt_bytes = prompt.len(),
            "sending window to backend"
        );

        let response: ChatResponse = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ReconcileError::Backend("response has no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_api_key() {
        let err = OpenAiBackend::new(OpenAiConfig::default()).err();
        assert!(matches!(err, Some(ReconcileError::MissingApiKey)));
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_completion_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "gpt-5-mini",
                "messages": [{"role": "user", "content": "hi"}],
                "max_completion_tokens": 20000
            })
        );
    }

    #[test]
    fn test_response_shape() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "[]"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("[]")
        );
    }
}
