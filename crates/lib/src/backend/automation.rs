//! Automation webhook client: POST the message and sender to a configured
//! workflow endpoint, read a `response`/`text` reply back.

use crate::backend::{extract_reply, REQUEST_TIMEOUT};
use serde_json::json;

/// Client for the workflow-automation webhook.
#[derive(Clone)]
pub struct AutomationClient {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("Automation error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Automation error: {0}")]
    Api(String),
}

impl AutomationClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// POST the message with sender identity and an RFC 3339 timestamp; return
    /// the reply text probed from the JSON body.
    pub async fn call(
        &self,
        message: &str,
        user_id: &str,
        user_name: &str,
        timestamp: &str,
    ) -> Result<String, AutomationError> {
        let body = json!({
            "message": message,
            "userId": user_id,
            "userName": user_name,
            "timestamp": timestamp,
        });
        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AutomationError::Api(format!("{} {}", status, body)));
        }
        let data: serde_json::Value = res.json().await?;
        Ok(extract_reply(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_prefix() {
        let e = AutomationError::Api("500 Internal Server Error".to_string());
        assert_eq!(e.to_string(), "Automation error: 500 Internal Server Error");
    }
}
