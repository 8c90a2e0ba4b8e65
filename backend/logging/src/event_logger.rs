//! Chat Event Logger
//!
//! Structured events (turn submitted, completed, failed, auth outcomes) written
//! through `tracing` under the `chat_events` target.

use chrono::{DateTime, Utc};
use dragon_core::{ErrorKind, TurnMode};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    TurnSubmitted {
        mode: TurnMode,
        content: String,
    },
    TurnCompleted {
        mode: TurnMode,
        content_chars: usize,
        updates: usize,
    },
    TurnFailed {
        mode: TurnMode,
        kind: ErrorKind,
        error_msg: String,
    },
    Auth {
        action: String,
        success: bool,
        detail: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ChatEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts the event's free-text fields and hands it to the tracing system.
    pub fn log_event(session_id: &str, mut event: ChatEvent) {
        match &mut event {
            ChatEvent::TurnSubmitted { content, .. } => {
                *content = redact_sensitive_data(content);
            }
            ChatEvent::TurnFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            ChatEvent::Auth {
                detail: Some(detail),
                ..
            } => {
                *detail = redact_sensitive_data(detail);
            }
            _ => {}
        }

        let failed = matches!(
            event,
            ChatEvent::TurnFailed { .. } | ChatEvent::Auth { success: false, .. }
        );

        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if failed {
            warn!(target: "chat_events", event = %json, "Chat event");
        } else {
            info!(target: "chat_events", event = %json, "Chat event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_tagged() {
        let entry = EventLogEntry {
            session_id: "s1".into(),
            timestamp: Utc::now(),
            event: ChatEvent::TurnFailed {
                mode: TurnMode::Streaming,
                kind: ErrorKind::Timeout,
                error_msg: "timed out".into(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "TurnFailed");
        assert_eq!(json["event"]["kind"], "timeout");
        assert_eq!(json["event"]["mode"], "streaming");
    }
}
