use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str =
    "Request timed out. Please check your connection and try again.";
pub const CONNECTION_REFUSED_MESSAGE: &str =
    "Cannot connect to server. Please make sure the backend server is running.";
pub const UNKNOWN_MESSAGE: &str = "An unexpected error occurred. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format from server";
pub const UNAUTHENTICATED_MESSAGE: &str = "No authentication token found. Please log in.";

/// Normalized failure taxonomy for every chat and auth call.
///
/// UI code keys its messaging off the variant (see [`ChatError::kind`]),
/// never off raw transport error strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid response format: {0}")]
    InvalidResponseFormat(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Discriminant of [`ChatError`] without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConnectionRefused,
    Timeout,
    Server,
    InvalidResponseFormat,
    Unauthenticated,
    Unknown,
}

impl ChatError {
    pub fn timeout() -> Self {
        Self::Timeout(TIMEOUT_MESSAGE.to_string())
    }

    pub fn connection_refused() -> Self {
        Self::ConnectionRefused(CONNECTION_REFUSED_MESSAGE.to_string())
    }

    pub fn unknown() -> Self {
        Self::Unknown(UNKNOWN_MESSAGE.to_string())
    }

    pub fn invalid_response() -> Self {
        Self::InvalidResponseFormat(INVALID_RESPONSE_MESSAGE.to_string())
    }

    pub fn unauthenticated() -> Self {
        Self::Unauthenticated(UNAUTHENTICATED_MESSAGE.to_string())
    }

    /// Build a server error from a status code and an optional body message.
    ///
    /// Falls back to `HTTP error: status {code}` when the body carried none.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error: status {status}"));
        Self::Server { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::ConnectionRefused(_) => ErrorKind::ConnectionRefused,
            ChatError::Timeout(_) => ErrorKind::Timeout,
            ChatError::Server { .. } => ErrorKind::Server,
            ChatError::InvalidResponseFormat(_) => ErrorKind::InvalidResponseFormat,
            ChatError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ChatError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status carried by a server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message a server error body actually carried, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ChatError::Server { status, message }
                if *message != format!("HTTP error: status {status}") =>
            {
                Some(message)
            }
            _ => None,
        }
    }

    /// The bare message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            ChatError::ConnectionRefused(m)
            | ChatError::Timeout(m)
            | ChatError::InvalidResponseFormat(m)
            | ChatError::Unauthenticated(m)
            | ChatError::Unknown(m) => m,
            ChatError::Server { message, .. } => message,
        }
    }

    /// Text shown to the user as assistant content or a form-level message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Server { status, message } => {
                format!("Server error: {status} - {message}")
            }
            other => other.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_body_message() {
        let err = ChatError::from_status(422, Some("bad input".into()));
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "bad input");
        assert_eq!(err.user_message(), "Server error: 422 - bad input");
    }

    #[test]
    fn test_from_status_generic_fallback() {
        let err = ChatError::from_status(500, None);
        assert_eq!(err.message(), "HTTP error: status 500");

        let blank = ChatError::from_status(502, Some("  ".into()));
        assert_eq!(blank.message(), "HTTP error: status 502");
        assert_eq!(blank.status(), Some(502));
    }

    #[test]
    fn test_server_message_only_when_body_had_one() {
        assert_eq!(
            ChatError::from_status(409, Some("taken".into())).server_message(),
            Some("taken")
        );
        assert_eq!(ChatError::from_status(409, None).server_message(), None);
        assert_eq!(ChatError::timeout().server_message(), None);
    }

    #[test]
    fn test_transport_kinds_carry_readable_messages() {
        assert_eq!(ChatError::timeout().kind(), ErrorKind::Timeout);
        assert_eq!(ChatError::timeout().user_message(), TIMEOUT_MESSAGE);
        assert_eq!(
            ChatError::connection_refused().user_message(),
            CONNECTION_REFUSED_MESSAGE
        );
        assert_eq!(ChatError::unknown().kind(), ErrorKind::Unknown);
        assert!(ChatError::unknown().status().is_none());
    }
}
