use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::types::Emotion;

/// Change notifications published by the chat service so views can re-render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A user message was appended and a turn is in flight
    TurnStarted,
    /// The in-progress assistant message now holds `content` (full text, not a delta)
    Updated { content: String },
    /// The turn closed successfully
    TurnCompleted,
    /// The turn closed with an error shown to the user
    TurnFailed { kind: ErrorKind, message: String },
    /// A submission was refused before any message was appended
    SubmitRejected { kind: ErrorKind, message: String },
    EmotionChanged { emotion: Emotion },
    ConnectionChanged { connected: bool },
}

impl SessionEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::TurnCompleted | SessionEvent::TurnFailed { .. }
        )
    }
}
