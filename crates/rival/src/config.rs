//! Application configuration.
//!
//! Loaded from a TOML file; every field has a default, so a missing file or
//! an empty one yields a working setup against the Blackbox endpoint.
//!
//! ```toml
//! llm_provider = "openai"
//! llm_model = "gpt-4o-mini"
//! llm_max_tokens = 16
//! request_timeout_secs = 10
//! reset_delay_ms = 2000
//! ```

use crate::llm_client::{LlmConfig, LlmProvider};
use crate::session::DEFAULT_RESET_DELAY;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the game and its suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct RivalConfig {
    /// Suggestion provider (blackbox, openai, anthropic or offline).
    llm_provider: LlmProvider,

    /// Model name; the provider's default when unset.
    #[setters(strip_option, into)]
    llm_model: Option<String>,

    /// Token budget for each suggestion response.
    llm_max_tokens: u32,

    /// Completion endpoint; the provider's default when unset.
    #[setters(strip_option, into)]
    llm_endpoint: Option<String>,

    /// Transport timeout for suggestion requests, in seconds.
    #[setters(strip_option)]
    request_timeout_secs: Option<u64>,

    /// Delay between a win and the automatic board reset, in milliseconds.
    reset_delay_ms: u64,
}

impl Default for RivalConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Blackbox,
            llm_model: None,
            llm_max_tokens: 1024,
            llm_endpoint: None,
            request_timeout_secs: None,
            reset_delay_ms: DEFAULT_RESET_DELAY.as_millis() as u64,
        }
    }
}

impl RivalConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.llm_provider, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Delay before the board resets after a win.
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    /// Creates the LLM configuration.
    ///
    /// OpenAI and Anthropic read their key from `OPENAI_API_KEY` and
    /// `ANTHROPIC_API_KEY`; Blackbox and offline need none.
    #[instrument(skip(self), fields(provider = %self.llm_provider))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        debug!("Creating LLM config");

        let api_key = match self.llm_provider.api_key_var() {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                ConfigError::new(format!("{} environment variable not set", var))
            })?),
            None => None,
        };

        let model = self
            .llm_model
            .clone()
            .unwrap_or_else(|| self.llm_provider.default_model().to_string());

        let mut config = LlmConfig::new(self.llm_provider, api_key, model, self.llm_max_tokens);
        if let Some(endpoint) = &self.llm_endpoint {
            config = config.with_endpoint(endpoint.as_str());
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_blackbox_setup() {
        let config = RivalConfig::default();
        assert_eq!(*config.llm_provider(), LlmProvider::Blackbox);
        assert_eq!(config.reset_delay(), Duration::from_millis(2000));

        let llm = config.create_llm_config().unwrap();
        assert_eq!(llm.model(), "deepseek-ai/DeepSeek-V3");
        assert_eq!(llm.endpoint(), "https://api.blackbox.ai/api/chat");
        assert_eq!(*llm.max_tokens(), 1024);
        assert!(llm.api_key().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm_provider = \"offline\"\nreset_delay_ms = 500\nllm_endpoint = \"http://127.0.0.1:9/chat\""
        )
        .unwrap();

        let config = RivalConfig::from_file(file.path()).unwrap();
        assert_eq!(*config.llm_provider(), LlmProvider::Offline);
        assert_eq!(config.reset_delay(), Duration::from_millis(500));
        assert_eq!(*config.llm_max_tokens(), 1024);

        let llm = config.create_llm_config().unwrap();
        assert_eq!(llm.endpoint(), "http://127.0.0.1:9/chat");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RivalConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, RivalConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm_provider = \"carrier-pigeon\"").unwrap();
        assert!(RivalConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let config = RivalConfig::default()
            .with_llm_provider(LlmProvider::Offline)
            .with_llm_model("tiny")
            .with_request_timeout_secs(3);

        let llm = config.create_llm_config().unwrap();
        assert_eq!(*llm.provider(), LlmProvider::Offline);
        assert_eq!(llm.model(), "tiny");
        assert_eq!(*llm.timeout(), Some(Duration::from_secs(3)));
    }
}
