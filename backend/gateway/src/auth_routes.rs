//! Cookie-session auth routes.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dragon_client::{validate_registration, LoginResponse, RequestOptions};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::auth::{cleared_cookie, session_cookie};
use crate::error::ApiError;
use crate::server::GatewayState;

const LOGIN_FAILED_MESSAGE: &str = "Login failed";
const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

fn with_cookie(status: StatusCode, cookie: &str, body: Value) -> Result<Response, ApiError> {
    let cookie = HeaderValue::from_str(cookie).map_err(|e| {
        error!(error = %e, "Session cookie is not a valid header value");
        ApiError::internal()
    })?;
    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Handler for `POST /api/auth/login`
pub async fn login(
    State(state): State<GatewayState>,
    Json(form): Json<LoginForm>,
) -> Result<Response, ApiError> {
    let reply = state
        .client
        .post::<LoginResponse, _>(
            &state.endpoints.login(),
            &json!({ "email": form.email, "password": form.password }),
            RequestOptions::default().with_timeout(state.upstream_timeout),
        )
        .await;

    match reply {
        Ok(reply) => match reply.token() {
            Some(token) => {
                info!(email = %form.email, "Login successful; setting session cookie");
                with_cookie(
                    StatusCode::OK,
                    &session_cookie(token, state.secure_cookies),
                    json!({ "message": "Login successful" }),
                )
            }
            None => {
                warn!(email = %form.email, "Backend accepted login without issuing a token");
                Err(ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    reply.message.clone().unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
                ))
            }
        },
        Err(err) => match err.status() {
            Some(status) => {
                warn!(status, email = %form.email, "Backend rejected login");
                Err(ApiError::new(
                    StatusCode::from_u16(status).unwrap_or(StatusCode::UNAUTHORIZED),
                    err.server_message().unwrap_or(LOGIN_FAILED_MESSAGE),
                ))
            }
            None => {
                error!(error = %err, "Login error");
                Err(ApiError::internal())
            }
        },
    }
}

/// Handler for `POST /api/auth/register`
pub async fn register(
    State(state): State<GatewayState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, ApiError> {
    if let Err(err) = validate_registration(&form.email, &form.password, &form.username) {
        return Err(ApiError::bad_request(err.form_message()));
    }

    let reply = state
        .client
        .post::<Value, _>(
            &state.endpoints.register(),
            &json!({
                "email": form.email,
                "password": form.password,
                "username": form.username,
            }),
            RequestOptions::default().with_timeout(state.upstream_timeout),
        )
        .await;

    match reply {
        Ok(_) => {
            info!(email = %form.email, username = %form.username, "Registration successful");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "Registration successful" })),
            )
                .into_response())
        }
        Err(err) => {
            error!(error = %err, "Registration error");
            let message = match (err.server_message(), err.status()) {
                (Some(message), _) => message.to_string(),
                (None, Some(_)) => REGISTRATION_FAILED_MESSAGE.to_string(),
                (None, None) => err.user_message(),
            };
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message))
        }
    }
}

/// Handler for `POST /api/auth/logout`
pub async fn logout(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    let mut response = with_cookie(
        StatusCode::OK,
        &cleared_cookie(state.secure_cookies),
        json!({ "message": "Logged out successfully" }),
    )?;
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    info!("Session cookie cleared");
    Ok(response)
}
