//! Chat-completion API client (OpenAI-style request/response shape).

use crate::backend::REQUEST_TIMEOUT;
use serde::{Deserialize, Serialize};

/// Persona instruction sent as the system message on every call.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant in Microsoft Teams.";

/// Fixed sampling temperature; promote to config if it ever needs to vary.
pub const TEMPERATURE: f64 = 0.7;

/// Fixed output cap in tokens.
pub const MAX_TOKENS: u32 = 500;

/// Client for a direct chat-completion HTTP API.
#[derive(Clone)]
pub struct CompletionClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Completion API error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Completion API error: {0}")]
    Api(String),
}

impl CompletionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// POST a two-message conversation (system persona, user text) and return
    /// the first choice's content.
    pub async fn call(&self, message: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        data.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CompletionError::Api("response contained no choices".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_first_choice_content() {
        let data: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"hi"}}]}"#).expect("parse");
        assert_eq!(data.choices[0].message.content, "hi");
    }

    #[test]
    fn request_shape_matches_api() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "hello".to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"].as_array().map(|m| m.len()), Some(2));
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn error_display_carries_prefix() {
        let e = CompletionError::Api("401 Unauthorized".to_string());
        assert_eq!(e.to_string(), "Completion API error: 401 Unauthorized");
    }
}
