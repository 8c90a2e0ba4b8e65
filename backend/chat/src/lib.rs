//! Chat turn machinery for Little Dragon.
//!
//! [`sse`] splits a raw response body into `data:` increments, [`reducer`]
//! folds them into the in-progress assistant text, [`session`] owns the
//! transcript and view flags, and [`service`] drives whole turns against the
//! backend.

pub mod reducer;
pub mod service;
pub mod session;
pub mod speech;
pub mod sse;

pub use reducer::StreamReducer;
pub use service::{ChatService, ChatServiceConfig};
pub use session::{ChatSession, SessionError, TurnOutcome, CONNECTION_FAILED_MESSAGE};
pub use speech::{TranscriptAccumulator, TranscriptEvent};
pub use sse::{extract_increment, SseLineDecoder};
