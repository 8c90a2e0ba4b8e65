//! TUI App State
//!
//! What one frame needs: the latest session snapshot plus local input state.

use dragon_chat::ChatSession;

pub struct AppState {
    pub session: ChatSession,
    pub input: String,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(session: ChatSession) -> Self {
        Self {
            session,
            input: String::new(),
            should_quit: false,
        }
    }

    /// Swap in a fresh snapshot, keeping the draft input.
    pub fn refresh(&mut self, session: ChatSession) {
        self.session = session;
    }

    /// Typing and sending are disabled while a reply is in flight or the
    /// backend is unreachable.
    pub fn input_enabled(&self) -> bool {
        self.session.accepts_input()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ChatSession::new())
    }
}
