use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Body of `POST /api/chat`, identical for buffered and streaming turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: Message,
}

/// Buffered reply from `POST /api/chat`.
///
/// Some backend revisions answer with `response` instead of `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, alias = "response")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            message: Message::user("hello"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"]["role"], "user");
        assert_eq!(json["message"]["content"], "hello");
        assert!(json["message"]["timestamp"].is_string());
    }

    #[test]
    fn test_chat_reply_accepts_response_alias() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(reply.message.as_deref(), Some("hi"));

        let reply: ChatReply =
            serde_json::from_str(r#"{"message":"yo","success":true}"#).unwrap();
        assert_eq!(reply.message.as_deref(), Some("yo"));
        assert_eq!(reply.success, Some(true));
    }

    #[test]
    fn test_chat_reply_missing_field_is_none() {
        let reply: ChatReply = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(reply.message.is_none());
    }
}
