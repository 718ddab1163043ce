//! Command-line interface for rival.

use clap::{Parser, Subcommand};
use rival::LlmProvider;
use std::path::PathBuf;

/// Rival - tic-tac-toe against a language model
#[derive(Parser, Debug)]
#[command(name = "rival")]
#[command(about = "Play tic-tac-toe against an LLM with a random-move fallback", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults apply if it does not exist)
    #[arg(short, long, default_value = "rival.toml", global = true)]
    pub config: PathBuf,

    /// Override the suggestion provider (blackbox, openai, anthropic, offline)
    #[arg(long, global = true)]
    pub provider: Option<LlmProvider>,

    /// Override the model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Never call the suggestion service; every automated move is random
    #[arg(long, global = true)]
    pub offline: bool,

    /// Subcommand to run (defaults to the terminal UI)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play in the terminal
    Tui,

    /// Serve the game as a JSON API
    Http {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_tui() {
        let cli = Cli::try_parse_from(["rival"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("rival.toml"));
        assert!(!cli.offline);
    }

    #[test]
    fn test_http_with_overrides() {
        let cli = Cli::try_parse_from([
            "rival", "http", "--port", "8080", "--provider", "openai", "--model", "gpt-4o",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Http { port: 8080, ref host }) if host == "127.0.0.1"
        ));
        assert_eq!(cli.provider, Some(LlmProvider::OpenAI));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(Cli::try_parse_from(["rival", "--provider", "pigeon"]).is_err());
    }
}
