//! Terminal chat UI for Little Dragon.
//!
//! Renders a [`dragon_chat::ChatSession`] snapshot with ratatui and feeds
//! keyboard input back into the chat service.

pub mod app;
pub mod input;
pub mod render;
pub mod runner;

pub use app::AppState;
pub use input::{handle_key_event, InputAction};
pub use render::draw_ui;
pub use runner::run_chat_ui;
