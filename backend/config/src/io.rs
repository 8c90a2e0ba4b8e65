//! Config file read/write with atomic backup rotation.

use crate::schema::DragonConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 3;

/// Resolve the Little Dragon config directory.
/// Priority: `LITTLE_DRAGON_CONFIG_DIR` env > `~/.little-dragon/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LITTLE_DRAGON_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".little-dragon"),
        None => PathBuf::from(".little-dragon"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<DragonConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(DragonConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses as YAML null.
    if raw.trim().is_empty() {
        return Ok(DragonConfig::default());
    }

    let config: DragonConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk atomically (write to temp file, rename).
///
/// Creates a rolling backup of the previous config before overwriting.
pub async fn write_config(config: &DragonConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if path.exists() {
        rotate_backups(path).await?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Rotate backup files: config.yaml.bak.1 -> .bak.2 -> ... -> .bak.N
async fn rotate_backups(path: &Path) -> Result<()> {
    for i in (1..MAX_BACKUPS).rev() {
        let old = path.with_extension(format!("yaml.bak.{i}"));
        let new = path.with_extension(format!("yaml.bak.{}", i + 1));
        if old.exists() {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = path.with_extension("yaml.bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BackendConfig, ChatConfig};

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert!(config.backend.is_none());
    }

    #[tokio::test]
    async fn test_write_then_load_keeps_values_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());

        let mut config = DragonConfig {
            backend: Some(BackendConfig {
                url: Some("http://first:1".into()),
            }),
            ..Default::default()
        };
        write_config(&config, &path).await.unwrap();

        config.chat = Some(ChatConfig {
            streaming: Some(false),
            ..Default::default()
        });
        write_config(&config, &path).await.unwrap();

        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded.backend_url(), "http://first:1");
        assert!(!loaded.streaming());
        assert!(path.with_extension("yaml.bak.1").exists());
    }

    #[tokio::test]
    async fn test_empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        fs::write(&path, "\n").await.unwrap();
        let config = load_config(&path).await.unwrap();
        assert!(config.chat.is_none());
    }
}
