//! Lesson generation through an OpenAI-compatible chat-completion API.
//!
//! The extracted text is sent together with a fixed system prompt that asks
//! the model for a JSON lesson. The lesson itself is treated as opaque: it
//! only has to be a JSON object, and it is passed through to the caller as is.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::text::prefix_chars;
use crate::{LektionError, Result};

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Version of [`SYSTEM_PROMPT`]. Bump whenever the prompt text changes.
pub const PROMPT_VERSION: &str = "2";

/// System prompt describing the lesson JSON the model must return.
pub const SYSTEM_PROMPT: &str = include_str!("../prompts/lesson_system.txt");

/// Provider error bodies are cut to this many characters.
const ERROR_BODY_CHARS: usize = 200;

/// The lesson object returned by the model.
pub type LessonPayload = Map<String, Value>;

/// Configuration for the chat-completion client
#[derive(Debug, Clone)]
pub struct LessonConfig {
    /// API root, without the `/chat/completions` suffix
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 16000,
            timeout: 90,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Formats the user message sent alongside the system prompt.
pub fn user_message(title: &str, content: &str) -> String {
    format!("Title: {}\n\nContent:\n{}", title, content)
}

/// Client for the lesson-generating model.
#[derive(Debug, Clone)]
pub struct LessonClient {
    http: Client,
    config: LessonConfig,
}

impl LessonClient {
    pub fn new(config: LessonConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(LektionError::HttpError)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LessonConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Asks the model for a lesson built from `title` and `content`.
    ///
    /// # Errors
    ///
    /// - [`LektionError::UpstreamAuth`] on 401
    /// - [`LektionError::UpstreamRateLimit`] on 429
    /// - [`LektionError::UpstreamProvider`] on any other non-200 status
    /// - [`LektionError::MalformedUpstreamResponse`] when the reply carries no
    ///   message content or the content is not a JSON object
    pub async fn generate(&self, api_key: &str, title: &str, content: &str) -> Result<LessonPayload> {
        let user = user_message(title, content);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT.trim() },
                ChatMessage { role: "user", content: &user },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::info!(
            model = %self.config.model,
            prompt_version = PROMPT_VERSION,
            content_chars = content.chars().count(),
            "requesting lesson"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LektionError::from_reqwest(e, self.config.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LektionError::from_reqwest(e, self.config.timeout))?;

        match status {
            StatusCode::OK => parse_completion(&body),
            StatusCode::UNAUTHORIZED => Err(LektionError::UpstreamAuth),
            StatusCode::TOO_MANY_REQUESTS => Err(LektionError::UpstreamRateLimit),
            other => {
                tracing::warn!(status = other.as_u16(), "language model request failed");
                Err(LektionError::UpstreamProvider {
                    status: other.as_u16(),
                    body: prefix_chars(&body, ERROR_BODY_CHARS).to_string(),
                })
            }
        }
    }
}

/// Pulls the lesson object out of a chat-completion response body.
fn parse_completion(body: &str) -> Result<LessonPayload> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LektionError::MalformedUpstreamResponse(format!("invalid completion JSON: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LektionError::MalformedUpstreamResponse("completion has no message content".to_string()))?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(lesson)) => Ok(lesson),
        Ok(_) => Err(LektionError::MalformedUpstreamResponse("lesson is not a JSON object".to_string())),
        Err(e) => Err(LektionError::MalformedUpstreamResponse(format!("lesson is not valid JSON: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(content: &str) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
    }

    #[test]
    fn test_user_message_format() {
        assert_eq!(user_message("Titel", "Text"), "Title: Titel\n\nContent:\nText");
    }

    #[test]
    fn test_prompt_describes_lesson_schema() {
        for key in ["vocabulary_highlights", "german_sentence", "correct_answer", "word_meanings"] {
            assert!(SYSTEM_PROMPT.contains(key), "prompt should mention {}", key);
        }
    }

    #[test]
    fn test_parse_completion_object() {
        let lesson = parse_completion(&completion(r#"{"title":"Elections","quiz":[]}"#)).unwrap();
        assert_eq!(lesson.get("title"), Some(&json!("Elections")));
    }

    #[test]
    fn test_parse_completion_not_object() {
        let result = parse_completion(&completion("[1, 2, 3]"));
        assert!(matches!(result, Err(LektionError::MalformedUpstreamResponse(_))));
    }

    #[test]
    fn test_parse_completion_not_json() {
        let result = parse_completion(&completion("Here is your lesson!"));
        assert!(matches!(result, Err(LektionError::MalformedUpstreamResponse(_))));
    }

    #[test]
    fn test_parse_completion_missing_choices() {
        let result = parse_completion(r#"{"choices": []}"#);
        assert!(matches!(result, Err(LektionError::MalformedUpstreamResponse(_))));
        let result = parse_completion(r#"{"choices": [{"message": {"content": null}}]}"#);
        assert!(matches!(result, Err(LektionError::MalformedUpstreamResponse(_))));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: DEFAULT_LLM_MODEL,
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: 0.3,
            max_tokens: 16000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["max_tokens"], 16000);
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
