//! TUI Rendering
//!
//! Translates `AppState` into Ratatui widgets and draws to the terminal frame.

use chrono::Local;
use dragon_core::{Emotion, Message, Role};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::AppState;

pub const EMPTY_STATE_TEXT: &str = "Start a conversation with Little Dragon!";
pub const TYPING_TEXT: &str = "Little Dragon is typing...";
pub const DISCONNECTED_TEXT: &str = "Not connected to server. Please check your connection.";

pub fn emotion_glyph(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Neutral => "(o.o)",
        Emotion::Thinking => "(o.O)?",
        Emotion::Happy => "(^o^)",
        Emotion::Listening => "(o.o)~",
    }
}

/// Assistant content that reads like an error gets highlighted.
fn looks_like_error(content: &str) -> bool {
    content.contains("error") || content.contains("Error")
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M:%S");
    let (label, alignment, body_style) = match message.role {
        Role::User => ("You", Alignment::Right, Style::default().fg(Color::Cyan)),
        Role::Assistant if looks_like_error(&message.content) => {
            ("Little Dragon", Alignment::Left, Style::default().fg(Color::Red))
        }
        Role::Assistant => ("Little Dragon", Alignment::Left, Style::default()),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)),
    ])
    .alignment(alignment)];
    lines.extend(
        message
            .content
            .lines()
            .map(|l| Line::styled(l.to_string(), body_style).alignment(alignment)),
    );
    lines.push(Line::default());
    lines
}

/// Main draw function.
pub fn draw_ui(f: &mut Frame, state: &AppState) {
    let session = &state.session;
    let banner_height = if session.connected() { 0 } else { 1 };
    let footer_height = if session.error().is_some() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Length(banner_height), // Connection banner
            Constraint::Min(3),                // Chat messages
            Constraint::Length(1),             // Typing indicator
            Constraint::Length(3),             // Input box
            Constraint::Length(footer_height), // Error footer
        ])
        .split(f.size());

    let header = Line::from(vec![
        Span::styled("Little Dragon ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(emotion_glyph(session.emotion()), Style::default().fg(Color::Magenta)),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    if !session.connected() {
        let banner = Paragraph::new(DISCONNECTED_TEXT)
            .style(Style::default().fg(Color::Black).bg(Color::Yellow));
        f.render_widget(banner, chunks[1]);
    }

    draw_messages(f, state, chunks[2]);

    if session.is_typing() {
        let typing = Paragraph::new(TYPING_TEXT)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
        f.render_widget(typing, chunks[3]);
    }

    let (title, style) = if state.input_enabled() {
        ("Message (Enter to send, Esc to quit)", Style::default().fg(Color::Yellow))
    } else {
        ("Message (disabled)", Style::default().fg(Color::DarkGray))
    };
    let input_widget = Paragraph::new(state.input.as_str())
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(input_widget, chunks[4]);

    if let Some(error) = session.error() {
        let footer = Paragraph::new(error).style(Style::default().fg(Color::Red));
        f.render_widget(footer, chunks[5]);
    }
}

fn draw_messages(f: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default().title("Chat").borders(Borders::ALL);
    let messages = state.session.messages();

    if messages.is_empty() {
        let empty = Paragraph::new(EMPTY_STATE_TEXT)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = messages.iter().flat_map(message_lines).collect();
    // Keep the newest lines in view.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;
    let widget = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(widget, area);
}
