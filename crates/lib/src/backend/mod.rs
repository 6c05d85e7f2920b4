//! Outbound LLM backends: automation webhook and chat-completion API.
//!
//! Both are stateless one-shot HTTP calls with a 30-second timeout. Failures
//! raise; nothing here retries or swallows errors.

mod automation;
mod completion;

pub use automation::{AutomationClient, AutomationError};
pub use completion::{CompletionClient, CompletionError, MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};

use std::time::Duration;

/// Timeout applied to every outbound backend request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply used when an automation response carries neither a `response` nor a
/// `text` field.
pub const NO_RESPONSE_FALLBACK: &str = "No response received";

/// Ordered probe of the automation response shape: `response`, then `text`,
/// then [`NO_RESPONSE_FALLBACK`].
pub fn extract_reply(body: &serde_json::Value) -> String {
    body.get("response")
        .and_then(|v| v.as_str())
        .or_else(|| body.get("text").and_then(|v| v.as_str()))
        .unwrap_or(NO_RESPONSE_FALLBACK)
        .to_string()
}

/// Error from whichever backend handled the message. The Display text keeps
/// the backend-specific prefix and is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Automation(#[from] AutomationError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_reply_prefers_response_field() {
        assert_eq!(extract_reply(&json!({ "response": "hi", "text": "no" })), "hi");
    }

    #[test]
    fn extract_reply_falls_back_to_text() {
        assert_eq!(extract_reply(&json!({ "text": "hi" })), "hi");
    }

    #[test]
    fn extract_reply_empty_body_uses_fallback() {
        assert_eq!(extract_reply(&json!({})), NO_RESPONSE_FALLBACK);
    }

    #[test]
    fn extract_reply_ignores_non_string_fields() {
        assert_eq!(extract_reply(&json!({ "response": 42 })), NO_RESPONSE_FALLBACK);
    }
}
