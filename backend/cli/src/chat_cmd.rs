//! `chat` and `ask` subcommands.

use std::io;

use anyhow::{bail, Result};
use dragon_chat::{ChatService, SessionError, TurnOutcome};
use dragon_core::SessionEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Runtime;
use crate::terminal_output::{note_error, stream_write};

/// Full-screen chat.
pub async fn run_chat(runtime: &Runtime, streaming: bool) -> Result<()> {
    tui::run_chat_ui(runtime.chat_service(streaming)).await
}

/// One turn, reply printed to stdout as it arrives.
pub async fn run_ask(runtime: &Runtime, text: &str, streaming: bool) -> Result<()> {
    let service = runtime.chat_service(streaming);
    ask(&service, text).await
}

async fn ask(service: &ChatService, text: &str) -> Result<()> {
    let mut out = io::stdout();
    let printer = spawn_printer(service.subscribe());

    let outcome = match service.submit(text).await {
        Ok(outcome) => outcome,
        Err(err) => {
            printer.abort();
            let message = match &err {
                SessionError::Unauthenticated(cause) => {
                    format!("{} Run `little-dragon login` first.", cause.user_message())
                }
                other => other.to_string(),
            };
            note_error(&message);
            bail!(err);
        }
    };

    let streamed = printer.await.unwrap_or_default();
    match outcome {
        TurnOutcome::Completed(reply) => {
            // Whatever the live updates did not cover (all of it for buffered turns).
            let rest = reply.get(streamed.len()..).filter(|_| reply.starts_with(&streamed));
            stream_write(&mut out, rest.unwrap_or(&reply))?;
            stream_write(&mut out, "\n")?;
            Ok(())
        }
        TurnOutcome::Failed(err) => {
            if !streamed.is_empty() {
                stream_write(&mut out, "\n")?;
            }
            note_error(&err.user_message());
            bail!(err)
        }
    }
}

/// Echo streaming updates to stdout until the turn closes. Returns what it printed.
fn spawn_printer(mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut printed = String::new();
        let mut stdout = io::stdout();
        loop {
            match events.recv().await {
                Ok(SessionEvent::Updated { content }) => {
                    if let Some(delta) = content.strip_prefix(printed.as_str()) {
                        if stream_write(&mut stdout, delta).is_err() {
                            break;
                        }
                        printed = content;
                    }
                }
                Ok(event) if event.is_terminal() => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Printer lagged behind updates"),
                Err(RecvError::Closed) => break,
            }
        }
        printed
    })
}
