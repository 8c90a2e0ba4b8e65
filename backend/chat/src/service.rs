//! Chat turn driver.
//!
//! Owns the session behind a lock, runs streaming or buffered turns against
//! the backend, publishes [`SessionEvent`]s for views, and schedules the
//! post-turn emotion revert.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use dragon_client::{ApiClient, ApiEndpoints, RequestOptions};
use dragon_core::{ChatError, ChatReply, ChatRequest, Emotion, Message, SessionEvent, TurnMode};
use logging::{ChatEvent, EventLogger};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::reducer::StreamReducer;
use crate::session::{ChatSession, SessionError, TurnOutcome};
use crate::speech::{TranscriptAccumulator, TranscriptEvent};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ChatServiceConfig {
    /// Use the streaming path for submissions.
    pub streaming: bool,
    /// Buffered-path and probe timeout.
    pub timeout: Duration,
    /// Delay before the emotion falls back to neutral after a turn.
    pub emotion_revert: Duration,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            streaming: true,
            timeout: Duration::from_secs(20),
            emotion_revert: Duration::from_millis(2000),
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    client: ApiClient,
    endpoints: ApiEndpoints,
    config: ChatServiceConfig,
    session: Arc<RwLock<ChatSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ChatService {
    pub fn new(client: ApiClient, endpoints: ApiEndpoints, config: ChatServiceConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            endpoints,
            config,
            session: Arc::new(RwLock::new(ChatSession::new())),
            events,
        }
    }

    pub fn config(&self) -> &ChatServiceConfig {
        &self.config
    }

    /// Copy of the current session for rendering.
    pub fn snapshot(&self) -> ChatSession {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChatSession> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Submit with the configured mode.
    pub async fn submit(&self, input: &str) -> Result<TurnOutcome, SessionError> {
        let mode = if self.config.streaming {
            TurnMode::Streaming
        } else {
            TurnMode::Buffered
        };
        self.submit_with_mode(input, mode).await
    }

    /// Run one full turn. Failures of the call itself end up in the transcript
    /// and come back as [`TurnOutcome::Failed`]; `Err` means no turn started.
    pub async fn submit_with_mode(
        &self,
        input: &str,
        mode: TurnMode,
    ) -> Result<TurnOutcome, SessionError> {
        let (user, generation, session_id) = self.open_turn(input, mode)?;
        EventLogger::log_event(
            &session_id,
            ChatEvent::TurnSubmitted {
                mode,
                content: user.content.clone(),
            },
        );

        let request = ChatRequest { message: user };
        let (outcome, updates) = match mode {
            TurnMode::Streaming => self.run_streaming(&request).await,
            TurnMode::Buffered => (self.run_buffered(&request).await, 0),
        };

        self.close_turn(&session_id, mode, generation, &outcome, updates);
        Ok(outcome)
    }

    fn open_turn(&self, input: &str, mode: TurnMode) -> Result<(Message, u64, String), SessionError> {
        let mut session = self.write();
        session.check_submit(input)?;
        if self.client.tokens().resolve().is_none() {
            warn!("No authentication token found; not sending message");
            let cause = session.reject_unauthenticated();
            drop(session);
            self.emit(SessionEvent::SubmitRejected {
                kind: cause.kind(),
                message: cause.user_message(),
            });
            return Err(SessionError::Unauthenticated(cause));
        }
        let (user, generation) = session.begin_turn(input, mode)?;
        let session_id = session.id().to_string();
        drop(session);

        self.emit(SessionEvent::TurnStarted);
        self.emit(SessionEvent::EmotionChanged {
            emotion: Emotion::Thinking,
        });
        Ok((user, generation, session_id))
    }

    async fn run_streaming(&self, request: &ChatRequest) -> (TurnOutcome, usize) {
        let stream = match self.client.stream(&self.endpoints.chat(), request).await {
            Ok(stream) => stream,
            Err(err) => return (TurnOutcome::Failed(err), 0),
        };

        let mut reducer = StreamReducer::new();
        let result = reducer
            .drive(stream, |text| {
                if self.write().update_stream(text) {
                    self.emit(SessionEvent::Updated {
                        content: text.to_string(),
                    });
                }
            })
            .await;
        let outcome = match result {
            Ok(text) => TurnOutcome::Completed(text),
            Err(err) => TurnOutcome::Failed(err),
        };
        (outcome, reducer.updates())
    }

    async fn run_buffered(&self, request: &ChatRequest) -> TurnOutcome {
        let options = RequestOptions::default().with_timeout(self.config.timeout);
        let reply = self
            .client
            .post::<ChatReply, _>(&self.endpoints.chat(), request, options)
            .await
            .and_then(|reply| {
                reply
                    .message
                    .filter(|m| !m.is_empty())
                    .ok_or_else(ChatError::invalid_response)
            });
        match reply {
            Ok(text) => TurnOutcome::Completed(text),
            Err(err) => TurnOutcome::Failed(err),
        }
    }

    fn close_turn(
        &self,
        session_id: &str,
        mode: TurnMode,
        generation: u64,
        outcome: &TurnOutcome,
        updates: usize,
    ) {
        let emotion = {
            let mut session = self.write();
            session.finish_turn(outcome);
            session.emotion()
        };

        match outcome {
            TurnOutcome::Completed(text) => {
                info!(session_id, ?mode, chars = text.chars().count(), "Turn completed");
                self.emit(SessionEvent::TurnCompleted);
                EventLogger::log_event(
                    session_id,
                    ChatEvent::TurnCompleted {
                        mode,
                        content_chars: text.chars().count(),
                        updates,
                    },
                );
            }
            TurnOutcome::Failed(err) => {
                warn!(session_id, ?mode, error = %err, "Turn failed");
                self.emit(SessionEvent::TurnFailed {
                    kind: err.kind(),
                    message: err.user_message(),
                });
                EventLogger::log_event(
                    session_id,
                    ChatEvent::TurnFailed {
                        mode,
                        kind: err.kind(),
                        error_msg: err.message().to_string(),
                    },
                );
            }
        }
        self.emit(SessionEvent::EmotionChanged { emotion });
        self.schedule_revert(generation);
    }

    /// Return the emotion to neutral after the configured delay unless a newer
    /// turn has started by then.
    fn schedule_revert(&self, generation: u64) {
        let session = Arc::clone(&self.session);
        let events = self.events.clone();
        let delay = self.config.emotion_revert;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reverted = session
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .revert_emotion(generation);
            if reverted {
                debug!(generation, "Emotion reverted to neutral");
                let _ = events.send(SessionEvent::EmotionChanged {
                    emotion: Emotion::Neutral,
                });
            }
        });
    }

    /// Probe the backend and record whether it answered.
    pub async fn check_connection(&self) -> bool {
        if self.client.tokens().resolve().is_none() {
            debug!("No token; skipping connectivity probe");
            self.write().mark_disconnected();
            self.emit(SessionEvent::ConnectionChanged { connected: false });
            return false;
        }

        let options = RequestOptions::default().with_timeout(self.config.timeout);
        let connected = match self.client.ping(&self.endpoints.probe(), options).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Connectivity probe failed");
                false
            }
        };
        self.write().set_connection(connected);
        self.emit(SessionEvent::ConnectionChanged { connected });
        connected
    }

    /// Speech capture started or stopped.
    pub fn set_listening(&self, listening: bool) {
        let (changed, emotion) = {
            let mut session = self.write();
            (session.set_listening(listening), session.emotion())
        };
        if changed {
            self.emit(SessionEvent::EmotionChanged { emotion });
        }
    }

    /// Feed a recognizer event; a finished transcript is submitted like typed
    /// input.
    pub async fn handle_transcript(
        &self,
        accumulator: &mut TranscriptAccumulator,
        event: TranscriptEvent,
    ) -> Option<Result<TurnOutcome, SessionError>> {
        let was_listening = accumulator.is_listening();
        let transcript = accumulator.apply(event);
        if accumulator.is_listening() != was_listening {
            self.set_listening(accumulator.is_listening());
        }
        match transcript {
            Some(text) => Some(self.submit(&text).await),
            None => None,
        }
    }
}
