//! AI feedback client. Single point of entry for resume analysis calls.
//!
//! No other module may call the Anthropic API directly. Calls are never
//! retried: a failure is classified into `AiError` and handed back to the
//! caller, which decides between the sample fallback and reporting.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::file::PDF_MIME;
use crate::platform::storage::{FileStorage, StorageError};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every feedback request.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

/// Closed classification of AI service failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("AI usage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("AI service rejected the request: {0}")]
    BadRequest(String),

    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI service failed: {0}")]
    Unknown(String),
}

impl AiError {
    /// Classifies an HTTP failure. Statuses without a fixed meaning fall
    /// back to the message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            402 | 403 | 429 => AiError::QuotaExceeded(message),
            400 => AiError::BadRequest(message),
            500..=599 => AiError::Unavailable(message),
            _ => match AiError::from_message(message) {
                AiError::Unavailable(m) => AiError::Unknown(m),
                other => other,
            },
        }
    }

    /// Classifies a platform error that only carries a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("usage-limited-chat") || message.contains("Permission denied") {
            AiError::QuotaExceeded(message)
        } else if message.contains("400") {
            AiError::BadRequest(message)
        } else if message.trim().is_empty() {
            AiError::Unavailable(message)
        } else {
            AiError::Unknown(message)
        }
    }
}

/// Chat-style reply from the AI service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Message content is either a bare string or a list of content blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

impl ChatResponse {
    #[cfg(test)]
    pub fn assistant(content: MessageContent) -> Self {
        Self {
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
        }
    }

    /// The feedback payload: the string content, or the first block's text.
    pub fn text(&self) -> Option<&str> {
        let text = match &self.message.content {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Blocks(blocks) => blocks.first().and_then(|b| b.text.as_deref()),
        };
        text.filter(|t| !t.is_empty())
    }
}

/// Produces feedback for a stored resume file.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    async fn feedback(&self, path: &str, instructions: &str) -> Result<ChatResponse, AiError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Document { source: DocumentSource },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct DocumentSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    role: String,
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Sends the stored PDF as a document block followed by the instructions.
#[derive(Clone)]
pub struct AnthropicFeedback {
    client: Client,
    api_key: String,
    storage: Arc<dyn FileStorage>,
}

impl AnthropicFeedback {
    pub fn new(api_key: String, storage: Arc<dyn FileStorage>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            storage,
        })
    }
}

#[async_trait]
impl FeedbackService for AnthropicFeedback {
    async fn feedback(&self, path: &str, instructions: &str) -> Result<ChatResponse, AiError> {
        let pdf = self.storage.read(path).await.map_err(|e| match e {
            StorageError::NotFound(p) => AiError::BadRequest(format!("file not found: {p}")),
            other => AiError::Unavailable(other.to_string()),
        })?;

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    RequestBlock::Document {
                        source: DocumentSource {
                            source_type: "base64",
                            media_type: PDF_MIME,
                            data: STANDARD.encode(&pdf),
                        },
                    },
                    RequestBlock::Text { text: instructions },
                ],
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("AI API returned {}: {}", status, message);
            return Err(AiError::from_status(status.as_u16(), message));
        }

        let reply: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AiError::Unknown(format!("unreadable AI response: {e}")))?;

        if let Some(usage) = &reply.usage {
            debug!(
                "AI feedback call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(ChatResponse {
            message: ChatMessage {
                role: reply.role,
                content: MessageContent::Blocks(reply.content),
            },
        })
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_classify_platform_messages() {
        assert!(matches!(
            AiError::from_message("Error: usage-limited-chat for this user"),
            AiError::QuotaExceeded(_)
        ));
        assert!(matches!(
            AiError::from_message("Permission denied"),
            AiError::QuotaExceeded(_)
        ));
        assert!(matches!(
            AiError::from_message("Request failed with status 400"),
            AiError::BadRequest(_)
        ));
        assert!(matches!(AiError::from_message(""), AiError::Unavailable(_)));
        assert!(matches!(
            AiError::from_message("model exploded"),
            AiError::Unknown(_)
        ));
    }

    #[test]
    fn test_classify_http_statuses() {
        assert!(matches!(AiError::from_status(429, "slow down"), AiError::QuotaExceeded(_)));
        assert!(matches!(AiError::from_status(403, "nope"), AiError::QuotaExceeded(_)));
        assert!(matches!(AiError::from_status(400, "bad pdf"), AiError::BadRequest(_)));
        assert!(matches!(AiError::from_status(529, "overloaded"), AiError::Unavailable(_)));
        assert!(matches!(AiError::from_status(404, ""), AiError::Unknown(_)));
        assert_eq!(
            AiError::from_status(418, "teapot"),
            AiError::Unknown("teapot".to_string())
        );
    }

    #[test]
    fn test_response_text_from_string_content() {
        let raw = r#"{"message": {"role": "assistant", "content": "{\"a\":1}"}}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_response_text_takes_first_block() {
        let raw = r#"{"message": {"role": "assistant", "content": [
            {"type": "text", "text": "first"},
            {"type": "text", "text": "second"}
        ]}}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text(), Some("first"));

        let empty = ChatResponse::assistant(MessageContent::Blocks(vec![]));
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_empty_text_counts_as_missing() {
        let blank = ChatResponse::assistant(MessageContent::Text(String::new()));
        assert_eq!(blank.text(), None);

        let blank_block = ChatResponse::assistant(MessageContent::Blocks(vec![ContentBlock {
            block_type: "text".to_string(),
            text: Some(String::new()),
        }]));
        assert_eq!(blank_block.text(), None);
    }

    #[test]
    fn test_request_serializes_document_then_text() {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    RequestBlock::Document {
                        source: DocumentSource {
                            source_type: "base64",
                            media_type: PDF_MIME,
                            data: STANDARD.encode(b"%PDF"),
                        },
                    },
                    RequestBlock::Text { text: "review" },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "document");
        assert_eq!(content[0]["source"]["media_type"], "application/pdf");
        assert_eq!(content[0]["source"]["data"], "JVBERg==");
        assert_eq!(content[1], serde_json::json!({"type": "text", "text": "review"}));
    }
}
