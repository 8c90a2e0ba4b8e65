//! Mapping from transport and HTTP failures onto [`ChatError`].

use std::error::Error as StdError;
use std::io;

use dragon_core::ChatError;
use serde_json::Value;
use tracing::debug;

/// Normalize a transport-level failure into `Timeout`, `ConnectionRefused`
/// or `Unknown`.
///
/// DNS failures and refused or reset connects are all reported by reqwest as
/// connect errors and surface as `ConnectionRefused`.
pub fn classify_transport(err: &reqwest::Error) -> ChatError {
    debug!(error = %err, "Transport failure");
    if err.is_timeout() || has_io_kind(err, io::ErrorKind::TimedOut) {
        ChatError::timeout()
    } else if err.is_connect() || has_io_kind(err, io::ErrorKind::ConnectionRefused) {
        ChatError::connection_refused()
    } else {
        ChatError::unknown()
    }
}

fn has_io_kind(err: &reqwest::Error, kind: io::ErrorKind) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == kind {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Build the error for a non-2xx response from its status and raw body.
///
/// A JSON body's `message` field wins; FastAPI-style `detail` strings are
/// accepted too.
pub fn status_error(status: u16, body: &[u8]) -> ChatError {
    let message = serde_json::from_slice::<Value>(body).ok().and_then(|v| {
        ["message", "detail"]
            .iter()
            .find_map(|field| v.get(*field).and_then(Value::as_str).map(str::to_string))
    });
    ChatError::from_status(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragon_core::ErrorKind;

    #[test]
    fn test_status_error_reads_message_field() {
        let err = status_error(401, br#"{"message":"Token expired"}"#);
        assert_eq!(err, ChatError::Server {
            status: 401,
            message: "Token expired".into()
        });
    }

    #[test]
    fn test_status_error_reads_detail_field() {
        let err = status_error(400, br#"{"detail":"Incorrect username or password"}"#);
        assert_eq!(err.message(), "Incorrect username or password");
    }

    #[test]
    fn test_status_error_non_json_body() {
        let err = status_error(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "HTTP error: status 502");
    }

    #[test]
    fn test_status_error_non_string_message() {
        let err = status_error(500, br#"{"message":{"nested":true}}"#);
        assert_eq!(err.message(), "HTTP error: status 500");
    }
}
