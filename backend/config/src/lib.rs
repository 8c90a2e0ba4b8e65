//! `dragon-config` — Little Dragon client configuration management.
//!
//! Provides:
//! - Typed config schema (backend, chat, storage, gateway, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and direct environment overrides
//! - Config redaction for safe logging/display
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::DragonConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, apply env substitution and overrides, apply defaults, and validate
/// a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<DragonConfig> {
    load_and_prepare_with(path, &std::env::vars().collect()).await
}

/// [`load_and_prepare`] against an explicit environment map.
pub async fn load_and_prepare_with(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<DragonConfig> {
    let raw_config = load_config(path).await?;

    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: DragonConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(apply_env_overrides_with(config, env));

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
