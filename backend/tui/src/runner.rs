//! Terminal setup and the draw/input loop.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dragon_chat::ChatService;
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};

use crate::app::AppState;
use crate::input::{handle_key_event, InputAction};
use crate::render::draw_ui;

const TICK: Duration = Duration::from_millis(250);

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run the chat UI until the user quits. The terminal is restored even when
/// the loop fails.
pub async fn run_chat_ui(service: ChatService) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, service).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")
}

fn spawn_probe(service: &ChatService) {
    let service = service.clone();
    tokio::spawn(async move {
        service.check_connection().await;
    });
}

async fn event_loop(terminal: &mut Term, service: ChatService) -> Result<()> {
    let mut state = AppState::new(service.snapshot());
    let mut keys = EventStream::new();
    let mut updates = service.subscribe();
    let mut tick = tokio::time::interval(TICK);

    info!(session_id = state.session.id(), "Chat UI started");
    spawn_probe(&service);

    loop {
        state.refresh(service.snapshot());
        terminal.draw(|f| draw_ui(f, &state))?;
        if state.should_quit {
            break;
        }

        tokio::select! {
            Some(event) = keys.next() => {
                let Event::Key(key) = event.context("failed to read terminal event")? else {
                    continue;
                };
                match handle_key_event(key, &mut state) {
                    Some(InputAction::Submit(text)) => {
                        let service = service.clone();
                        tokio::spawn(async move {
                            if let Err(e) = service.submit(&text).await {
                                debug!(error = %e, "Submission rejected");
                            }
                        });
                    }
                    Some(InputAction::Reconnect) => spawn_probe(&service),
                    None => {}
                }
            }
            _ = updates.recv() => {}
            _ = tick.tick() => {}
        }
    }

    info!("Chat UI closed");
    Ok(())
}
