//! Login, registration and logout against the backend auth routes.

use std::io;

use dragon_core::ChatError;
use logging::{ChatEvent, EventLogger};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::endpoints::ApiEndpoints;
use crate::http::{ApiClient, RequestOptions};

const AUTH_LOG_SESSION: &str = "auth";

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email format";
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 8 characters long";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

#[derive(Debug, Error)]
pub enum AuthError {
    /// Input rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// Backend answered 2xx but did not grant a session.
    #[error("{0}")]
    Rejected(String),

    #[error("auth request failed: {0}")]
    Request(#[from] ChatError),

    #[error("failed to persist token: {0}")]
    Storage(#[from] io::Error),
}

impl AuthError {
    /// Message suitable for display next to the login/register form.
    pub fn form_message(&self) -> String {
        match self {
            AuthError::Validation(m) | AuthError::Rejected(m) => m.clone(),
            AuthError::Request(ChatError::Server { message, .. }) => message.clone(),
            AuthError::Request(err) => err.user_message(),
            AuthError::Storage(_) => "Could not save the login session.".to_string(),
        }
    }
}

/// Check registration input the way the form does.
pub fn validate_registration(email: &str, password: &str, username: &str) -> Result<(), AuthError> {
    if email.is_empty() || password.is_empty() || username.is_empty() {
        return Err(AuthError::Validation(MISSING_FIELDS_MESSAGE.into()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AuthError::Validation(INVALID_EMAIL_MESSAGE.into()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::Validation(SHORT_PASSWORD_MESSAGE.into()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    email: &'a str,
    password: &'a str,
    username: &'a str,
}

/// Login reply. The token arrives as `token` or as OAuth-style `access_token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.access_token.as_deref().filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    endpoints: ApiEndpoints,
}

impl AuthService {
    pub fn new(client: ApiClient, endpoints: ApiEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.tokens().resolve().is_some()
    }

    /// Log in and keep the issued token in the local store.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let result = self.try_login(email, password).await;
        log_auth("login", &result);
        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let reply: LoginResponse = self
            .client
            .post(
                &self.endpoints.login(),
                &Credentials { email, password },
                RequestOptions::default(),
            )
            .await?;

        let token = reply
            .token()
            .ok_or_else(|| AuthError::Rejected(INVALID_CREDENTIALS_MESSAGE.into()))?;
        self.client.tokens().store(token)?;
        info!(email, "Logged in");
        Ok(reply)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Value, AuthError> {
        let result = self.try_register(email, password, username).await;
        log_auth("register", &result);
        result
    }

    async fn try_register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Value, AuthError> {
        validate_registration(email, password, username)?;
        let reply = self
            .client
            .post(
                &self.endpoints.register(),
                &Registration {
                    email,
                    password,
                    username,
                },
                RequestOptions::default(),
            )
            .await?;
        info!(email, username, "Registered");
        Ok(reply)
    }

    /// Tell the backend, then forget the token locally whatever it said.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let remote: Result<Value, ChatError> = self
            .client
            .post(&self.endpoints.logout(), &Value::Null, RequestOptions::default())
            .await;
        if let Err(err) = &remote {
            warn!(error = %err, "Backend logout failed; clearing local session anyway");
        }

        let outcome = self.client.tokens().clear().map_err(AuthError::from);
        log_auth("logout", &outcome);
        outcome
    }
}

fn log_auth<T>(action: &str, result: &Result<T, AuthError>) {
    let event = match result {
        Ok(_) => ChatEvent::Auth {
            action: action.into(),
            success: true,
            detail: None,
        },
        Err(err) => ChatEvent::Auth {
            action: action.into(),
            success: false,
            detail: Some(err.to_string()),
        },
    };
    EventLogger::log_event(AUTH_LOG_SESSION, event);
}
