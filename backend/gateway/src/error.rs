//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dragon_core::ChatError;
use serde_json::json;

pub const BACKEND_UNREACHABLE_MESSAGE: &str =
    "Cannot connect to backend server. Please make sure the backend server is running.";
pub const BACKEND_TIMEOUT_MESSAGE: &str = "Connection to backend server timed out.";
pub const BACKEND_ERROR_MESSAGE: &str = "Backend server error";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// `{ "message": ... }` with a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    /// Map an upstream failure the way the chat route reports it.
    pub fn from_upstream(err: &ChatError) -> Self {
        match err {
            ChatError::ConnectionRefused(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, BACKEND_UNREACHABLE_MESSAGE)
            }
            ChatError::Timeout(_) => Self::new(StatusCode::GATEWAY_TIMEOUT, BACKEND_TIMEOUT_MESSAGE),
            ChatError::Server { status, .. } => Self::new(
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                err.server_message().unwrap_or(BACKEND_ERROR_MESSAGE),
            ),
            _ => Self::internal(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}
