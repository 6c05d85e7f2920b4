//! Message dispatcher and lifecycle greeter.
//!
//! One inbound message activity produces at most one reply: command-prefixed
//! text is ignored, everything else gets a typing indicator, one backend call,
//! and the reply (or a user-visible error line). Backend failures are caught
//! here; failures talking to the conversation itself propagate to the server's
//! last-resort handler.

use crate::activity::Activity;
use crate::backend::{AutomationClient, BackendError, CompletionClient};
use crate::channel::ConversationApi;
use crate::config::LlmSettings;
use anyhow::Result;

/// Inbound text starting with this is reserved for future commands and ignored.
pub const COMMAND_PREFIX: char = '/';

/// Reply when neither backend is configured. A normal reply, not an error.
pub const CONFIG_ERROR_TEXT: &str =
    "LLM service not configured. Please set AUTOMATION_ENDPOINT_URL or COMPLETION_API_KEY.";

/// Greeting for members added to a conversation.
pub const WELCOME_TEXT: &str =
    "Hello! I'm your LLM assistant. Just type your question and I'll help you!";

/// Which backend handles messages (first match wins, resolved once at startup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    Automation,
    Completion,
    Unconfigured,
}

/// Selection policy: automation when requested and configured; otherwise the
/// completion key decides. `use_automation` with an empty URL falls through to
/// the completion check.
pub fn resolve_backend(settings: &LlmSettings) -> BackendChoice {
    let automation_url = settings
        .automation_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if settings.use_automation && automation_url.is_some() {
        return BackendChoice::Automation;
    }
    let key = settings
        .completion_api_key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if key.is_some() {
        BackendChoice::Completion
    } else {
        BackendChoice::Unconfigured
    }
}

enum Backend {
    Automation(AutomationClient),
    Completion(CompletionClient),
    Unconfigured,
}

/// Routes inbound activities: messages to a backend, membership updates to the
/// greeter. Holds no per-conversation state.
pub struct Dispatcher {
    backend: Backend,
}

impl Dispatcher {
    pub fn new(settings: LlmSettings) -> Self {
        let backend = match resolve_backend(&settings) {
            BackendChoice::Automation => Backend::Automation(AutomationClient::new(
                settings.automation_url.unwrap_or_default(),
            )),
            BackendChoice::Completion => Backend::Completion(CompletionClient::new(
                settings.completion_endpoint,
                settings.completion_api_key.unwrap_or_default(),
                settings.model_name,
            )),
            BackendChoice::Unconfigured => {
                log::warn!("no LLM backend configured; replying with setup instructions");
                Backend::Unconfigured
            }
        };
        Self { backend }
    }

    /// Route one inbound activity. Unknown activity types are ignored.
    pub async fn handle_activity(
        &self,
        activity: &Activity,
        conversation: &dyn ConversationApi,
    ) -> Result<()> {
        if activity.is_message() {
            self.on_message(activity, conversation).await
        } else if activity.is_conversation_update() && !activity.members_added.is_empty() {
            self.on_members_added(activity, conversation).await
        } else {
            log::debug!("ignoring activity type {:?}", activity.activity_type);
            Ok(())
        }
    }

    /// Handle a message: filter commands, signal typing, call the backend,
    /// send exactly one reply.
    pub async fn on_message(
        &self,
        activity: &Activity,
        conversation: &dyn ConversationApi,
    ) -> Result<()> {
        let text = activity.text.as_deref().unwrap_or("").trim();
        if text.starts_with(COMMAND_PREFIX) {
            log::debug!("ignoring command-prefixed message");
            return Ok(());
        }

        let conversation_id = conversation_id(activity)?;
        conversation
            .send_activity(conversation_id, &Activity::typing())
            .await
            .map_err(|e| anyhow::anyhow!("sending typing indicator: {}", e))?;

        let reply = match self.backend_reply(text, activity).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("backend call failed: {}", e);
                format!("Sorry, I encountered an error: {}", e)
            }
        };

        conversation
            .send_activity(conversation_id, &Activity::message(reply))
            .await
            .map_err(|e| anyhow::anyhow!("sending reply: {}", e))?;
        Ok(())
    }

    async fn backend_reply(&self, text: &str, activity: &Activity) -> Result<String, BackendError> {
        match &self.backend {
            Backend::Automation(client) => {
                let (user_id, user_name) = match activity.from {
                    Some(ref from) => (from.id.as_str(), from.name.as_deref().unwrap_or("")),
                    None => ("", ""),
                };
                let timestamp = chrono::Utc::now().to_rfc3339();
                Ok(client.call(text, user_id, user_name, &timestamp).await?)
            }
            Backend::Completion(client) => Ok(client.call(text).await?),
            Backend::Unconfigured => Ok(CONFIG_ERROR_TEXT.to_string()),
        }
    }

    /// Greet each added member except the bot itself.
    pub async fn on_members_added(
        &self,
        activity: &Activity,
        conversation: &dyn ConversationApi,
    ) -> Result<()> {
        let conversation_id = conversation_id(activity)?;
        let bot_id = activity
            .recipient
            .as_ref()
            .map(|r| r.id.as_str())
            .unwrap_or("");
        for member in &activity.members_added {
            if member.id != bot_id {
                conversation
                    .send_activity(conversation_id, &Activity::message(WELCOME_TEXT))
                    .await
                    .map_err(|e| anyhow::anyhow!("sending welcome: {}", e))?;
            }
        }
        Ok(())
    }
}

fn conversation_id(activity: &Activity) -> Result<&str> {
    activity
        .conversation
        .as_ref()
        .map(|c| c.id.as_str())
        .ok_or_else(|| anyhow::anyhow!("activity missing conversation id"))
}
