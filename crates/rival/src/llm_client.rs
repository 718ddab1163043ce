//! LLM API client used as the move-suggestion service.
//!
//! Blackbox and OpenAI both speak the chat-completions wire format:
//! `{"messages": [...], "model": ..., "max_tokens": ...}` in, text at
//! `choices[0].message.content` out. Anthropic uses its messages API.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// LLM provider selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LlmProvider {
    /// Blackbox chat endpoint (no API key).
    Blackbox,
    /// OpenAI chat completions.
    OpenAI,
    /// Anthropic messages API.
    Anthropic,
    /// No network; every request fails.
    Offline,
}

impl LlmProvider {
    /// Endpoint used unless the configuration overrides it.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Blackbox => "https://api.blackbox.ai/api/chat",
            LlmProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LlmProvider::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmProvider::Offline => "",
        }
    }

    /// Model used unless the configuration overrides it.
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Blackbox => "deepseek-ai/DeepSeek-V3",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-haiku-20241022",
            LlmProvider::Offline => "none",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Blackbox | LlmProvider::Offline => None,
        }
    }
}

/// Configuration for the LLM client.
#[derive(Debug, Clone, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct LlmConfig {
    /// Provider to talk to.
    #[setters(skip)]
    provider: LlmProvider,
    /// API key, when the provider needs one.
    #[setters(skip)]
    api_key: Option<String>,
    /// Model identifier sent with each request.
    #[setters(skip)]
    model: String,
    /// Token budget for the response.
    #[setters(skip)]
    max_tokens: u32,
    /// Full URL of the completion endpoint.
    #[setters(into)]
    endpoint: String,
    /// Transport timeout; `None` waits as long as the connection allows.
    #[setters(strip_option)]
    timeout: Option<Duration>,
}

impl LlmConfig {
    /// Creates a configuration pointing at the provider's default endpoint.
    #[instrument(skip(api_key), fields(provider = %provider, model = %model))]
    pub fn new(
        provider: LlmProvider,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
    ) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            endpoint: provider.default_endpoint().to_string(),
            timeout: None,
        }
    }
}

/// LLM client that abstracts over the supported providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built.
    #[instrument(
        skip(config),
        fields(provider = %config.provider(), endpoint = %config.endpoint())
    )]
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        info!("Creating LLM client");
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(*timeout);
        }
        let http = builder
            .build()
            .map_err(|e| LlmError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends a single user turn and returns the response text.
    #[instrument(
        skip(self, user_message),
        fields(provider = %self.config.provider, model = %self.config.model)
    )]
    pub async fn generate(&self, user_message: &str) -> Result<String, LlmError> {
        debug!("Generating completion");
        match self.config.provider {
            LlmProvider::Blackbox | LlmProvider::OpenAI => {
                self.generate_chat_completion(user_message).await
            }
            LlmProvider::Anthropic => self.generate_anthropic(user_message).await,
            LlmProvider::Offline => Err(LlmError::new("Suggestion service is offline")),
        }
    }

    /// Generates a completion over the chat-completions wire format.
    #[instrument(skip(self, user_message))]
    async fn generate_chat_completion(&self, user_message: &str) -> Result<String, LlmError> {
        debug!("Building chat completion request");
        let request_body = serde_json::json!({
            "messages": [
                {
                    "content": user_message,
                    "role": "user"
                }
            ],
            "model": self.config.model,
            "max_tokens": self.config.max_tokens
        });

        let mut request = self.http.post(&self.config.endpoint).json(&request_body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!(endpoint = %self.config.endpoint, "Sending chat completion request");
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Chat completion request failed");
            LlmError::new(format!("Chat completion request failed: {}", e))
        })?;

        let response_json = Self::read_json(response).await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No content in chat completion response");
                LlmError::new("No content in chat completion response")
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using Anthropic Claude.
    #[instrument(skip(self, user_message))]
    async fn generate_anthropic(&self, user_message: &str) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::new("Anthropic requires an API key"))?;

        debug!("Building Anthropic API request");
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": user_message
                }
            ]
        });

        debug!("Sending request to Anthropic");
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                LlmError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let response_json = Self::read_json(response).await?;
        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                LlmError::new("No text content in Anthropic response")
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Checks the status and parses the body as JSON.
    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, LlmError> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "API error");
            return Err(LlmError::new(format!(
                "API error {}: {}",
                status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing response");
        serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
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
