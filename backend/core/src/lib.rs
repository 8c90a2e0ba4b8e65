pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{ChatError, ErrorKind};
pub use event::SessionEvent;
pub use message::{ChatReply, ChatRequest, Message, Role};
pub use traits::KeyValueStore;
pub use types::{Emotion, StreamState, TurnMode, ACCESS_TOKEN_KEY};
