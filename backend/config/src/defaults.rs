//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{BackendConfig, ChatConfig, DragonConfig, GatewayConfig, LoggingConfig};

/// Default local backend address.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8005";

/// Buffered chat calls give up after this many seconds.
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 20;

/// The assistant returns to a neutral mood this long after a turn ends.
pub const DEFAULT_EMOTION_REVERT_MS: u64 = 2_000;

pub const DEFAULT_GATEWAY_BIND: &str = "127.0.0.1";

pub const DEFAULT_GATEWAY_PORT: u16 = 3000;

/// Forwarded gateway calls give up after this many seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: DragonConfig) -> DragonConfig {
    let config = apply_backend_defaults(config);
    let config = apply_chat_defaults(config);
    let config = apply_gateway_defaults(config);
    apply_logging_defaults(config)
}

fn apply_backend_defaults(mut config: DragonConfig) -> DragonConfig {
    let backend = config.backend.get_or_insert_with(BackendConfig::default);
    match backend.url.as_deref().map(str::trim) {
        None | Some("") => backend.url = Some(DEFAULT_BACKEND_URL.to_string()),
        Some(url) => backend.url = Some(url.trim_end_matches('/').to_string()),
    }
    config
}

fn apply_chat_defaults(mut config: DragonConfig) -> DragonConfig {
    let chat = config.chat.get_or_insert_with(ChatConfig::default);
    chat.streaming.get_or_insert(true);
    chat.timeout_secs.get_or_insert(DEFAULT_CHAT_TIMEOUT_SECS);
    chat.emotion_revert_ms.get_or_insert(DEFAULT_EMOTION_REVERT_MS);
    config
}

fn apply_gateway_defaults(mut config: DragonConfig) -> DragonConfig {
    let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
    if gateway.bind.is_none() {
        gateway.bind = Some(DEFAULT_GATEWAY_BIND.to_string());
    }
    gateway.port.get_or_insert(DEFAULT_GATEWAY_PORT);
    gateway.secure_cookies.get_or_insert(false);
    gateway
        .upstream_timeout_secs
        .get_or_insert(DEFAULT_UPSTREAM_TIMEOUT_SECS);
    config
}

fn apply_logging_defaults(mut config: DragonConfig) -> DragonConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_every_section() {
        let config = apply_all_defaults(DragonConfig::default());
        assert_eq!(
            config.backend.unwrap().url.as_deref(),
            Some(DEFAULT_BACKEND_URL)
        );
        let chat = config.chat.unwrap();
        assert_eq!(chat.streaming, Some(true));
        assert_eq!(chat.timeout_secs, Some(DEFAULT_CHAT_TIMEOUT_SECS));
        assert_eq!(config.gateway.unwrap().port, Some(DEFAULT_GATEWAY_PORT));
    }

    #[test]
    fn test_trailing_slash_trimmed_from_backend_url() {
        let config = DragonConfig {
            backend: Some(BackendConfig {
                url: Some("http://example.test:8005/".into()),
            }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        assert_eq!(config.backend_url(), "http://example.test:8005");
    }

    #[test]
    fn test_existing_values_kept() {
        let config = DragonConfig {
            chat: Some(ChatConfig {
                streaming: Some(false),
                timeout_secs: Some(3),
                emotion_revert_ms: None,
            }),
            ..Default::default()
        };
        let chat = apply_all_defaults(config).chat.unwrap();
        assert_eq!(chat.streaming, Some(false));
        assert_eq!(chat.timeout_secs, Some(3));
        assert_eq!(chat.emotion_revert_ms, Some(DEFAULT_EMOTION_REVERT_MS));
    }
}
