//! `login`, `register` and `logout` subcommands.

use anyhow::{anyhow, Result};

use crate::config::Runtime;
use crate::terminal_output::{note_error, note_info, note_success};

pub async fn login(runtime: &Runtime, email: &str, password: &str) -> Result<()> {
    match runtime.auth_service().login(email, password).await {
        Ok(_) => {
            note_success(&format!("Logged in as {email}"));
            Ok(())
        }
        Err(err) => {
            note_error(&err.form_message());
            Err(anyhow!(err))
        }
    }
}

pub async fn register(runtime: &Runtime, email: &str, password: &str, username: &str) -> Result<()> {
    match runtime.auth_service().register(email, password, username).await {
        Ok(_) => {
            note_success("Registration successful");
            note_info("Run `little-dragon login` to start chatting.");
            Ok(())
        }
        Err(err) => {
            note_error(&err.form_message());
            Err(anyhow!(err))
        }
    }
}

pub async fn logout(runtime: &Runtime) -> Result<()> {
    runtime.auth_service().logout().await.map_err(|err| {
        note_error(&err.form_message());
        anyhow!(err)
    })?;
    note_success("Logged out successfully");
    Ok(())
}
