//! Bot Framework activity envelope (the inbound webhook body and outbound replies).

use serde::{Deserialize, Serialize};

pub const ACTIVITY_TYPE_MESSAGE: &str = "message";
pub const ACTIVITY_TYPE_TYPING: &str = "typing";
pub const ACTIVITY_TYPE_CONVERSATION_UPDATE: &str = "conversationUpdate";

/// One conversational event: a message, a typing indicator, or a membership
/// change. Inbound activities carry more fields than we read; unknown fields
/// are ignored on deserialize and `None` fields are omitted on serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
}

/// A user or bot identity on the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    pub id: String,
}

impl Activity {
    /// Outbound text message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            activity_type: ACTIVITY_TYPE_MESSAGE.to_string(),
            text: Some(text.into()),
            ..Self::empty()
        }
    }

    /// Outbound typing indicator.
    pub fn typing() -> Self {
        Self {
            activity_type: ACTIVITY_TYPE_TYPING.to_string(),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            activity_type: String::new(),
            id: None,
            text: None,
            from: None,
            recipient: None,
            conversation: None,
            service_url: None,
            reply_to_id: None,
            members_added: Vec::new(),
        }
    }

    /// True for `"message"` activities.
    pub fn is_message(&self) -> bool {
        self.activity_type == ACTIVITY_TYPE_MESSAGE
    }

    /// True for `"conversationUpdate"` activities.
    pub fn is_conversation_update(&self) -> bool {
        self.activity_type == ACTIVITY_TYPE_CONVERSATION_UPDATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_inbound_message() {
        let activity: Activity = serde_json::from_str(
            r#"{
                "type": "message",
                "id": "1",
                "text": "hello",
                "from": { "id": "user-1", "name": "Ada" },
                "recipient": { "id": "bot-1" },
                "conversation": { "id": "conv-1" },
                "serviceUrl": "https://smba.example",
                "channelId": "msteams"
            }"#,
        )
        .expect("parse activity");
        assert!(activity.is_message());
        assert_eq!(activity.text.as_deref(), Some("hello"));
        assert_eq!(activity.from.as_ref().map(|f| f.id.as_str()), Some("user-1"));
        assert_eq!(activity.service_url.as_deref(), Some("https://smba.example"));
        assert!(activity.members_added.is_empty());
    }

    #[test]
    fn serialize_typing_omits_empty_fields() {
        let json = serde_json::to_value(Activity::typing()).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "typing" }));
    }

    #[test]
    fn deserialize_members_added() {
        let activity: Activity = serde_json::from_str(
            r#"{
                "type": "conversationUpdate",
                "membersAdded": [{ "id": "bot-1" }, { "id": "user-1", "name": "Ada" }],
                "recipient": { "id": "bot-1" },
                "conversation": { "id": "conv-1" }
            }"#,
        )
        .expect("parse activity");
        assert!(activity.is_conversation_update());
        assert_eq!(activity.members_added.len(), 2);
    }
}
