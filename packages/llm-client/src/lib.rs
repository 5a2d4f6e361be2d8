//! OpenAI-compatible chat completions client
//!
//! A minimal client for providers that speak the OpenAI chat completions
//! protocol (DeepSeek, OpenAI, most gateways). No domain logic lives here.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{ChatClient, ChatRequest, Message, Provider};
//!
//! let provider: Provider = "deepseek/deepseek-chat".parse()?;
//! let client = ChatClient::for_provider(api_key, &provider, None)?;
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new(&provider.model)
//!             .message(Message::user("Hello!"))
//!             .temperature(0.1),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod provider;
pub mod types;

pub use error::{LlmError, Result};
pub use provider::Provider;
pub use types::*;

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest error body kept in an [`LlmError::Api`].
const MAX_ERROR_BODY: usize = 500;

/// Chat completions client bound to one API key and endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    provider_name: String,
}

impl ChatClient {
    /// Create a new client talking to DeepSeek with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: provider::DEEPSEEK_BASE_URL.to_string(),
            provider_name: "deepseek".to_string(),
        }
    }

    /// Create a client for a `provider/model` identifier.
    ///
    /// `base_url` overrides the provider's default endpoint and is required for
    /// providers this crate does not know.
    pub fn for_provider(
        api_key: impl Into<String>,
        provider: &Provider,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let base_url = base_url
            .or_else(|| provider.default_base_url())
            .ok_or_else(|| {
                LlmError::Config(format!(
                    "no base URL known for provider '{}'; pass one explicitly",
                    provider.name
                ))
            })?;

        Ok(Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            provider_name: provider.name.clone(),
        })
    }

    /// Set a custom base URL (for proxies, local gateways, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;
        Ok(self)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get the first choice back.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, provider = %self.provider_name, "Chat request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = truncate_to_char_boundary(&error_text, MAX_ERROR_BODY).to_string();
            warn!(status = %status, error = %message, "Chat API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: types::CompletionBody = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: self.provider_name.clone(),
            })?;

        let content = choice.message.content.ok_or_else(|| LlmError::EmptyResponse {
            provider: self.provider_name.clone(),
        })?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            finish_reason = ?choice.finish_reason,
            "Chat completion"
        );

        Ok(ChatResponse {
            content,
            finish_reason: choice.finish_reason,
            usage: raw.usage,
        })
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("provider", &self.provider_name)
            .finish()
    }
}
