//! Gateway Health API

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler for `GET /api/`
pub async fn get_index() -> Json<Value> {
    Json(json!({ "message": "API is working!" }))
}

/// Handler for `GET /api/health`
pub async fn get_health() -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "little-dragon-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}
