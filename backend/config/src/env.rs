//! Environment handling for config values.
//!
//! `${VAR_NAME}` references inside string values are resolved at load time
//! (uppercase `[A-Z_][A-Z0-9_]*` names only); `$${VAR}` escapes to a literal
//! `${VAR}`. A handful of well-known variables also override fields directly.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{BackendConfig, DragonConfig, LoggingConfig};

/// Matches `${VAR}` and the escaped form `$${VAR}`.
static ENV_REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Backend URL overrides, highest priority first.
pub const BACKEND_URL_VARS: &[&str] = &["LITTLE_DRAGON_API_URL", "NEXT_PUBLIC_API_URL"];

/// Log level override.
pub const LOG_LEVEL_VAR: &str = "LITTLE_DRAGON_LOG";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree using the
/// process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let replaced = ENV_REF_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[1];
        if caps[0].starts_with("$$") {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(replaced.into_owned())
}

/// Apply direct variable overrides (`LITTLE_DRAGON_API_URL`, `LITTLE_DRAGON_LOG`).
pub fn apply_env_overrides(config: DragonConfig) -> DragonConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

pub fn apply_env_overrides_with(
    mut config: DragonConfig,
    env: &HashMap<String, String>,
) -> DragonConfig {
    let url = BACKEND_URL_VARS
        .iter()
        .filter_map(|var| env.get(*var))
        .find(|v| !v.trim().is_empty());
    if let Some(url) = url {
        config.backend.get_or_insert_with(BackendConfig::default).url =
            Some(url.trim().to_string());
    }

    if let Some(level) = env.get(LOG_LEVEL_VAR).filter(|v| !v.trim().is_empty()) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.clone());
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_nested_var() {
        let v = json!({"backend": {"url": "http://${DRAGON_HOST}:8005"}});
        let result = resolve_env_vars_with(&v, &env(&[("DRAGON_HOST", "api.local")])).unwrap();
        assert_eq!(result["backend"]["url"], "http://api.local:8005");
    }

    #[test]
    fn error_names_missing_var_and_path() {
        let v = json!({"storage": {"cookieHeader": "${MISSING_COOKIE}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("MISSING_COOKIE"));
        assert!(text.contains("storage.cookieHeader"));
    }

    #[test]
    fn escaped_reference_is_kept_literal() {
        let v = json!({"note": "$${NOT_A_VAR}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["note"], "${NOT_A_VAR}");
    }

    #[test]
    fn overrides_prefer_little_dragon_var() {
        let config = apply_env_overrides_with(
            DragonConfig::default(),
            &env(&[
                ("NEXT_PUBLIC_API_URL", "http://next:1"),
                ("LITTLE_DRAGON_API_URL", "http://dragon:2"),
                ("LITTLE_DRAGON_LOG", "debug"),
            ]),
        );
        assert_eq!(config.backend_url(), "http://dragon:2");
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn overrides_fall_back_to_next_public_var() {
        let config = apply_env_overrides_with(
            DragonConfig::default(),
            &env(&[("NEXT_PUBLIC_API_URL", "http://next:1")]),
        );
        assert_eq!(config.backend_url(), "http://next:1");
    }
}
