//! Ephemeral chat transcript plus the flags a view renders from.

use dragon_core::{ChatError, Emotion, Message, Role, TurnMode};
use thiserror::Error;
use uuid::Uuid;

pub const CONNECTION_FAILED_MESSAGE: &str = "Failed to connect to the server";

/// Reasons a submission never became a turn.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a reply is still in progress")]
    Busy,

    #[error("message is empty")]
    EmptyInput,

    #[error("{}", .0.user_message())]
    Unauthenticated(ChatError),
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed(String),
    Failed(ChatError),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }
}

/// One conversation. Holds at most one turn in flight.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    messages: Vec<Message>,
    is_typing: bool,
    emotion: Emotion,
    error: Option<String>,
    connected: bool,
    generation: u64,
    in_flight: Option<TurnMode>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            is_typing: false,
            emotion: Emotion::Neutral,
            error: None,
            connected: false,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Counter bumped by every started turn.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether input would currently be accepted from the keyboard.
    pub fn accepts_input(&self) -> bool {
        self.connected && !self.is_typing
    }

    /// Check a submission without changing anything. Returns the trimmed text.
    pub fn check_submit<'a>(&self, input: &'a str) -> Result<&'a str, SessionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        Ok(trimmed)
    }

    /// Record that no token was available for a submission.
    pub fn reject_unauthenticated(&mut self) -> ChatError {
        let err = ChatError::unauthenticated();
        self.error = Some(err.user_message());
        err
    }

    /// Open a turn: append the user message (and for streaming turns an
    /// empty assistant placeholder). Returns the user message and the turn's
    /// generation.
    pub fn begin_turn(&mut self, input: &str, mode: TurnMode) -> Result<(Message, u64), SessionError> {
        let content = self.check_submit(input)?;
        let user = Message::user(content);
        self.messages.push(user.clone());
        if mode == TurnMode::Streaming {
            self.messages.push(Message::assistant(""));
        }
        self.in_flight = Some(mode);
        self.is_typing = true;
        self.emotion = Emotion::Thinking;
        self.error = None;
        self.generation += 1;
        Ok((user, self.generation))
    }

    /// Overwrite the in-progress assistant message with the full text so far.
    /// Ignored unless a streaming turn is open.
    pub fn update_stream(&mut self, content: &str) -> bool {
        if self.in_flight != Some(TurnMode::Streaming) {
            return false;
        }
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                last.content.clear();
                last.content.push_str(content);
                true
            }
            _ => false,
        }
    }

    /// Close the open turn. Returns false when no turn was open.
    pub fn finish_turn(&mut self, outcome: &TurnOutcome) -> bool {
        let Some(mode) = self.in_flight.take() else {
            return false;
        };
        let content = match outcome {
            TurnOutcome::Completed(text) => {
                self.emotion = Emotion::Happy;
                text.clone()
            }
            TurnOutcome::Failed(err) => {
                let text = err.user_message();
                self.error = Some(text.clone());
                self.emotion = Emotion::Neutral;
                text
            }
        };
        match mode {
            TurnMode::Streaming => {
                if let Some(last) = self.messages.last_mut() {
                    last.content = content;
                }
            }
            TurnMode::Buffered => self.messages.push(Message::assistant(content)),
        }
        self.is_typing = false;
        true
    }

    /// Apply a deferred emotion revert. Does nothing if a newer turn started.
    pub fn revert_emotion(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.is_typing {
            return false;
        }
        if self.emotion == Emotion::Neutral {
            return false;
        }
        self.emotion = Emotion::Neutral;
        true
    }

    /// Speech capture started or stopped. Never overrides a turn in flight.
    pub fn set_listening(&mut self, listening: bool) -> bool {
        if self.is_typing {
            return false;
        }
        let next = if listening {
            Emotion::Listening
        } else if self.emotion == Emotion::Listening {
            Emotion::Neutral
        } else {
            return false;
        };
        let changed = self.emotion != next;
        self.emotion = next;
        changed
    }

    /// Record a connectivity probe result.
    pub fn set_connection(&mut self, connected: bool) {
        self.connected = connected;
        self.error = if connected {
            None
        } else {
            Some(CONNECTION_FAILED_MESSAGE.to_string())
        };
    }

    /// Mark disconnected without an error, e.g. when no token exists.
    pub fn mark_disconnected(&mut self) {
        self.connected = false;
    }
}
