use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage key under which the bearer token lives in every store.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Presentation mood of the assistant avatar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Thinking,
    Happy,
    Listening,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Emotion::Neutral => "neutral",
            Emotion::Thinking => "thinking",
            Emotion::Happy => "happy",
            Emotion::Listening => "listening",
        };
        write!(f, "{s}")
    }
}

/// How a chat turn receives its reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnMode {
    /// An empty assistant message is appended up front and rewritten in place.
    Streaming,
    /// The assistant message is appended once the whole reply arrives.
    Buffered,
}

/// Lifecycle of one streaming response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    #[default]
    Idle,
    Streaming,
    Completed,
    Failed,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Completed | StreamState::Failed)
    }
}
