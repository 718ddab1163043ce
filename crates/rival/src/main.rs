//! Rival - unified CLI
//!
//! Plays tic-tac-toe against an LLM, either in the terminal or as a JSON API.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use rival::{GameSession, LlmProvider, MoveResolver, RivalConfig, SessionHandle, build_service};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rival=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Tui);

    match &command {
        Command::Tui => init_file_tracing("rival_tui.log")?,
        Command::Http { .. } => init_stderr_tracing(),
    }

    let config = load_config(&cli)?;
    let handle = start_session(&config)?;

    match command {
        Command::Tui => tui::run_tui(handle).await,
        Command::Http { port, host } => {
            info!(%host, port, "Starting HTTP API");
            rival::serve(host, port, handle).await?;
            Ok(())
        }
    }
}

/// Logs to a file so output does not interfere with the TUI.
fn init_file_tracing(path: &str) -> Result<()> {
    let log_file = std::fs::File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn init_stderr_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the config file and applies command-line overrides.
#[instrument(skip_all, fields(config_path = %cli.config.display()))]
fn load_config(cli: &Cli) -> Result<RivalConfig> {
    let mut config = RivalConfig::load_or_default(&cli.config)?;

    if let Some(provider) = cli.provider {
        config = config.with_llm_provider(provider);
    }
    if cli.offline {
        config = config.with_llm_provider(LlmProvider::Offline);
    }
    if let Some(model) = &cli.model {
        config = config.with_llm_model(model.as_str());
    }

    info!(provider = %config.llm_provider(), "Configuration ready");
    Ok(config)
}

/// Builds the suggestion service and starts the session task.
#[instrument(skip_all)]
fn start_session(config: &RivalConfig) -> Result<SessionHandle> {
    let llm_config = config.create_llm_config()?;
    let service = build_service(llm_config)?;
    info!(service = service.name(), "Suggestion service ready");

    let resolver = MoveResolver::new(service);
    Ok(GameSession::new(resolver, config.reset_delay()).spawn())
}
