//! Bot Framework connector: deliver outbound activities to the service URL
//! the inbound activity came from.

use crate::activity::Activity;
use crate::channel::auth::TokenProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends activities into a conversation.
#[async_trait]
pub trait ConversationApi: Send + Sync {
    /// Deliver one activity to a conversation. Errors are transport-level
    /// (status + body) as a plain string.
    async fn send_activity(&self, conversation_id: &str, activity: &Activity)
        -> Result<(), String>;
}

/// Connector client bound to one service URL (taken from the inbound activity).
pub struct ConnectorClient {
    service_url: String,
    auth: Arc<TokenProvider>,
    client: reqwest::Client,
}

impl ConnectorClient {
    pub fn new(service_url: impl Into<String>, auth: Arc<TokenProvider>) -> Self {
        Self {
            service_url: service_url.into().trim_end_matches('/').to_string(),
            auth,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ConversationApi for ConnectorClient {
    /// POST /v3/conversations/{id}/activities with an optional bearer token.
    async fn send_activity(
        &self,
        conversation_id: &str,
        activity: &Activity,
    ) -> Result<(), String> {
        let url = format!(
            "{}/v3/conversations/{}/activities",
            self.service_url, conversation_id
        );
        let mut req = self.client.post(&url).json(activity);
        match self.auth.bearer().await {
            Ok(Some(token)) => req = req.bearer_auth(token),
            Ok(None) => {}
            Err(e) => return Err(format!("connector auth failed: {}", e)),
        }
        let res = req.send().await.map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("send activity failed: {} {}", status, body));
        }
        Ok(())
    }
}
