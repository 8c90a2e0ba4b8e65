//! Config validation: schema checks with user-friendly error messages.

use crate::schema::DragonConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &DragonConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_backend(config, &mut report);
    validate_chat(config, &mut report);
    validate_gateway(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_backend(config: &DragonConfig, report: &mut ValidationReport) {
    let Some(url) = config.backend.as_ref().and_then(|b| b.url.as_deref()) else {
        return;
    };
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error("backend.url", format!("'{url}' is not an http(s) URL"));
    }
}

fn validate_chat(config: &DragonConfig, report: &mut ValidationReport) {
    let Some(chat) = &config.chat else { return };
    if chat.timeout_secs == Some(0) {
        report.error("chat.timeoutSecs", "timeoutSecs must be >= 1");
    }
    if chat.streaming == Some(false) {
        report.warn(
            "chat.streaming",
            "Streaming disabled; replies appear only once complete",
        );
    }
}

fn validate_gateway(config: &DragonConfig, report: &mut ValidationReport) {
    let Some(gw) = &config.gateway else { return };
    if gw.port == Some(0) {
        report.error("gateway.port", "port must be > 0");
    }
    if gw.upstream_timeout_secs == Some(0) {
        report.error("gateway.upstreamTimeoutSecs", "upstreamTimeoutSecs must be >= 1");
    }
    let exposed = gw
        .bind
        .as_deref()
        .map(|b| b != "127.0.0.1" && b != "localhost" && b != "::1")
        .unwrap_or(false);
    if exposed && gw.secure_cookies != Some(true) {
        report.warn(
            "gateway.secureCookies",
            "Gateway is reachable off-host but access_token cookies are not marked Secure",
        );
    }
}

fn validate_logging(config: &DragonConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else {
        return;
    };
    // EnvFilter directives like "dragon_chat=debug" are allowed through.
    if !level.contains('=') && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BackendConfig, ChatConfig, GatewayConfig, LoggingConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&DragonConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn non_http_backend_is_error() {
        let cfg = DragonConfig {
            backend: Some(BackendConfig {
                url: Some("ftp://nope".into()),
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "backend.url");
    }

    #[test]
    fn zero_timeout_is_error() {
        let cfg = DragonConfig {
            chat: Some(ChatConfig {
                timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(!validate(&cfg).is_valid());
    }

    #[test]
    fn exposed_gateway_without_secure_cookies_warns() {
        let cfg = DragonConfig {
            gateway: Some(GatewayConfig {
                bind: Some("0.0.0.0".into()),
                ..Default::default()
            }),
            logging: Some(LoggingConfig {
                level: Some("dragon_chat=debug".into()),
                dir: None,
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "gateway.secureCookies");
    }
}
