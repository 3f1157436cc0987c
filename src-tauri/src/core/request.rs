//! Chat-completion request building
//!
//! Turns (text, source language, target language, model) into the wire
//! payload the endpoint expects, and validates the configured base URL
//! before any network attempt is made.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// JSON body sent to the chat-completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WirePayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

/// Expected response shape; only `choices[0].message.content` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Content of the first completion choice, empty when absent.
    pub fn first_content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("")
    }
}

/// Build the wire payload for one translation request.
pub fn build_payload(text: &str, source: &str, target: &str, model: &str) -> WirePayload {
    WirePayload {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: "You are a helpful translator.".to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!("Translate this text from {} to {}:\n\n{}", source, target, text),
            },
        ],
    }
}

/// Validate the configured base URL. Runs before any network attempt so a
/// broken endpoint surfaces as `InvalidEndpoint` instead of a transport error.
pub fn parse_endpoint(api_base_url: &str) -> AppResult<Url> {
    Url::parse(api_base_url)
        .map_err(|e| AppError::InvalidEndpoint(format!("{}: {}", api_base_url, e)))
}
