//! CLI Status Command
//!
//! Reports backend health, connectivity and local session state.

use anyhow::Result;
use dragon_client::RequestOptions;
use serde_json::Value;

use crate::config::Runtime;
use crate::terminal_output::{render_table, supports_color, GREEN, RED, RESET, YELLOW};

fn paint(color: &str, text: &str) -> String {
    if supports_color() {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub async fn run(runtime: &Runtime) -> Result<()> {
    println!("\nLittle Dragon status\n");
    let timeout = RequestOptions::default().with_timeout(runtime.config.chat_timeout());

    let health = match runtime
        .client
        .get::<Value>(&runtime.endpoints.health(), timeout.clone())
        .await
    {
        Ok(body) => {
            let status = body["status"].as_str().unwrap_or("unknown").to_string();
            paint(GREEN, &status)
        }
        Err(err) => paint(RED, &err.user_message()),
    };

    let authenticated = runtime.tokens().resolve().is_some();
    let probe = if !authenticated {
        paint(YELLOW, "skipped (not logged in)")
    } else {
        match runtime.client.ping(&runtime.endpoints.probe(), timeout).await {
            Ok(()) => paint(GREEN, "connected"),
            Err(err) => paint(RED, &err.user_message()),
        }
    };

    let rows = vec![
        vec!["Backend".to_string(), runtime.endpoints.base().to_string()],
        vec!["Health".to_string(), health],
        vec!["Connection".to_string(), probe],
        vec![
            "Session".to_string(),
            if authenticated { "logged in" } else { "logged out" }.to_string(),
        ],
    ];
    print!("{}", render_table(&["Check", "Result"], &rows));
    println!();
    Ok(())
}
