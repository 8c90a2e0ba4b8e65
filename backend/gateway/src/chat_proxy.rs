//! `POST /api/chat` forwarding.

use axum::{extract::State, Json};
use dragon_client::RequestOptions;
use serde_json::Value;
use tracing::{error, info};

use crate::auth::CallerTokens;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Relay the JSON body to the backend chat route and hand back its reply.
pub async fn forward_chat(
    State(state): State<GatewayState>,
    CallerTokens(tokens): CallerTokens,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let url = state.endpoints.chat();
    info!(backend = %url, authenticated = tokens.resolve().is_some(), "Forwarding chat request");

    let client = state.client.with_tokens(tokens);
    let options = RequestOptions::default().with_timeout(state.upstream_timeout);
    match client.post::<Value, _>(&url, &body, options).await {
        Ok(reply) => Ok(Json(reply)),
        Err(err) => {
            error!(kind = ?err.kind(), error = %err, "Chat forwarding failed");
            Err(ApiError::from_upstream(&err))
        }
    }
}
