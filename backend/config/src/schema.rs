//! Little Dragon client configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and the
//! accessor methods below always return a usable value.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_BACKEND_URL, DEFAULT_CHAT_TIMEOUT_SECS, DEFAULT_EMOTION_REVERT_MS,
    DEFAULT_GATEWAY_BIND, DEFAULT_GATEWAY_PORT, DEFAULT_LOG_LEVEL, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the client, the terminal UI and the proxy gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragonConfig {
    /// External chat/auth backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    /// Chat turn behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatConfig>,

    /// Token storage locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    /// Proxy gateway server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:8005`
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// Use the SSE streaming path instead of one buffered POST
    pub streaming: Option<bool>,
    /// Timeout for buffered chat calls, in seconds
    pub timeout_secs: Option<u64>,
    /// Delay before the assistant's mood reverts to neutral, in milliseconds
    pub emotion_revert_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Directory holding the local token store
    pub dir: Option<String>,
    /// Raw `Cookie:` header to seed the cookie jar with
    pub cookie_header: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    /// Mark the `access_token` cookie `Secure`
    pub secure_cookies: Option<bool>,
    /// Timeout for forwarded backend calls, in seconds
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// Directory for the rolling NDJSON log file
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl DragonConfig {
    pub fn backend_url(&self) -> String {
        self.backend
            .as_ref()
            .and_then(|b| b.url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn streaming(&self) -> bool {
        self.chat.as_ref().and_then(|c| c.streaming).unwrap_or(true)
    }

    pub fn chat_timeout(&self) -> Duration {
        let secs = self
            .chat
            .as_ref()
            .and_then(|c| c.timeout_secs)
            .unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn emotion_revert_delay(&self) -> Duration {
        let ms = self
            .chat
            .as_ref()
            .and_then(|c| c.emotion_revert_ms)
            .unwrap_or(DEFAULT_EMOTION_REVERT_MS);
        Duration::from_millis(ms)
    }

    /// Directory of the local token store; falls back to the config directory.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.dir.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(crate::io::config_dir)
    }

    pub fn cookie_header(&self) -> Option<String> {
        self.storage.as_ref().and_then(|s| s.cookie_header.clone())
    }

    pub fn gateway_bind(&self) -> String {
        self.gateway
            .as_ref()
            .and_then(|g| g.bind.clone())
            .unwrap_or_else(|| DEFAULT_GATEWAY_BIND.to_string())
    }

    pub fn gateway_port(&self) -> u16 {
        self.gateway
            .as_ref()
            .and_then(|g| g.port)
            .unwrap_or(DEFAULT_GATEWAY_PORT)
    }

    pub fn secure_cookies(&self) -> bool {
        self.gateway
            .as_ref()
            .and_then(|g| g.secure_cookies)
            .unwrap_or(false)
    }

    pub fn upstream_timeout(&self) -> Duration {
        let secs = self
            .gateway
            .as_ref()
            .and_then(|g| g.upstream_timeout_secs)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn log_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::io::config_dir().join("logs"))
    }
}
