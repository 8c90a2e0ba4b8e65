//! `config` subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use dragon_config::{collect_redacted_paths, redact, validate, write_config, DragonConfig};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Print the effective config with secrets masked, then its validation report.
pub fn show(config: &DragonConfig, path: &Path) -> Result<()> {
    let value = serde_json::to_value(config).context("failed to serialize config")?;
    note_info(&format!("Config file: {}", path.display()));
    println!("{}", serde_json::to_string_pretty(&redact(&value))?);

    for masked in collect_redacted_paths(&value) {
        note_info(&format!("{masked} is masked"));
    }
    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    Ok(())
}

/// Write the effective config to `path`, keeping backups of what was there.
pub async fn init(config: &DragonConfig, path: &Path) -> Result<()> {
    write_config(config, path).await?;
    note_success(&format!("Wrote {}", path.display()));
    Ok(())
}
