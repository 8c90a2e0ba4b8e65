//! Keyboard Input Handler
//!
//! Processes crossterm key events and updates `AppState`. Anything that needs
//! the chat service is handed back as an [`InputAction`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Send this text as a chat turn.
    Submit(String),
    /// Re-run the connectivity probe.
    Reconnect,
}

/// Handles a single keyboard event.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            state.should_quit = true;
            None
        }
        KeyCode::Char('r') if ctrl => Some(InputAction::Reconnect),
        KeyCode::Esc => {
            state.should_quit = true;
            None
        }
        _ if !state.input_enabled() => None,
        KeyCode::Enter => {
            if state.input.trim().is_empty() {
                return None;
            }
            let text = std::mem::take(&mut state.input);
            Some(InputAction::Submit(text))
        }
        KeyCode::Backspace => {
            state.input.pop();
            None
        }
        KeyCode::Char(c) => {
            state.input.push(c);
            None
        }
        _ => None,
    }
}
