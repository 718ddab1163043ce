//! The move-suggestion service seam.

use crate::llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// An external source of move suggestions.
///
/// Implementations return the raw response text; interpreting it is the
/// resolver's job. Responses are untrusted.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Sends one request and awaits one response.
    async fn suggest(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl SuggestionService for LlmClient {
    async fn suggest(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(prompt).await
    }

    fn name(&self) -> &'static str {
        (*self.config().provider()).into()
    }
}

/// Service that never answers, so every automated move is a fallback move.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

#[async_trait]
impl SuggestionService for OfflineService {
    async fn suggest(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::new("Suggestion service is offline"))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Builds the service described by `config`.
///
/// # Errors
///
/// Fails if the HTTP client for a networked provider cannot be built.
#[instrument(skip(config), fields(provider = %config.provider()))]
pub fn build_service(config: LlmConfig) -> Result<Arc<dyn SuggestionService>, LlmError> {
    if *config.provider() == LlmProvider::Offline {
        info!("Suggestion service disabled; all automated moves are random");
        return Ok(Arc::new(OfflineService));
    }
    Ok(Arc::new(LlmClient::new(config)?))
}
