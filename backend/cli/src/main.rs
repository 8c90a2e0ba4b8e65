mod auth_cmd;
mod chat_cmd;
mod config;
mod config_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use config::Runtime;

#[derive(Parser, Debug)]
#[command(name = "little-dragon")]
#[command(about = "Little Dragon: chat with your companion from the terminal")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.little-dragon/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive chat screen
    Chat {
        /// Wait for the whole reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
    /// Send one message and print the reply
    Ask {
        text: String,
        #[arg(long)]
        no_stream: bool,
    },
    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        username: String,
    },
    /// Forget the stored access token
    Logout,
    /// Check backend health and connectivity
    Status,
    /// Run the cookie-session HTTP gateway
    Serve {
        /// Port to bind the gateway to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Inspect or write the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Write the effective config to disk
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| dragon_config::config_file_path(&dragon_config::config_dir()));
    let config = dragon_config::load_and_prepare(&path)
        .await
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    let log_dir = config.log_dir();
    tokio::fs::create_dir_all(&log_dir)
        .await
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    // The chat screen owns the terminal, so it only logs to file.
    if matches!(cli.command, Commands::Chat { .. }) {
        logging::init_file_logger(&log_dir, &config.log_level());
    } else {
        logging::init_logger(&log_dir, &config.log_level());
    }

    let streaming = config.streaming();
    let runtime = Runtime::from_config(config);

    match cli.command {
        Commands::Chat { no_stream } => chat_cmd::run_chat(&runtime, streaming && !no_stream).await,
        Commands::Ask { text, no_stream } => {
            chat_cmd::run_ask(&runtime, &text, streaming && !no_stream).await
        }
        Commands::Login { email, password } => auth_cmd::login(&runtime, &email, &password).await,
        Commands::Register {
            email,
            password,
            username,
        } => auth_cmd::register(&runtime, &email, &password, &username).await,
        Commands::Logout => auth_cmd::logout(&runtime).await,
        Commands::Status => status_cmd::run(&runtime).await,
        Commands::Serve { port } => {
            let (addr, state) = runtime.gateway(port)?;
            info!(%addr, backend = %runtime.endpoints.base(), "Starting gateway");
            dragon_gateway::start_server(addr, state).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(&runtime.config, &path),
            ConfigAction::Init => config_cmd::init(&runtime.config, &path).await,
        },
    }
}
