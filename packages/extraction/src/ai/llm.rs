//! Extractor backed by an OpenAI-compatible chat completions API.
//!
//! # Example
//!
//! ```rust,ignore
//! use extraction::ai::LlmExtractor;
//!
//! let scraper = Scraper::new(HttpRenderer::new(), LlmExtractor::new());
//! ```

use std::time::Duration;

use async_trait::async_trait;
use llm_client::{ChatClient, ChatRequest, LlmError, Message, Provider};
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};
use crate::pipeline::chunking::Chunk;
use crate::pipeline::normalize::strip_code_fence;
use crate::pipeline::prompts::{format_system_prompt, format_user_prompt};
use crate::traits::extractor::Extractor;
use crate::types::request::ExtractionRequest;

/// Default bound on one model call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// LLM extractor. Provider, model, knobs and credential come from the request.
#[derive(Debug, Clone)]
pub struct LlmExtractor {
    timeout: Duration,
}

impl Default for LlmExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmExtractor {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound each model call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn client(&self, request: &ExtractionRequest) -> Result<(ChatClient, Provider)> {
        let llm = request.llm();
        let provider: Provider = llm.provider.parse().map_err(to_scrape_error)?;
        let client = ChatClient::for_provider(
            request.credentials().api_key().expose(),
            &provider,
            llm.base_url.as_deref(),
        )
        .and_then(|client| client.with_timeout(self.timeout))
        .map_err(to_scrape_error)?;
        Ok((client, provider))
    }

    fn chat_request(request: &ExtractionRequest, provider: &Provider, chunk: &Chunk) -> ChatRequest {
        let use_case = request.use_case();
        let llm = request.llm();

        let mut chat = ChatRequest::new(provider.model.clone())
            .message(Message::system(format_system_prompt(
                &use_case.instruction,
                &use_case.schema,
            )))
            .message(Message::user(format_user_prompt(request.url(), chunk)));

        if let Some(temperature) = llm.temperature {
            chat = chat.temperature(temperature);
        }
        if let Some(max_tokens) = llm.max_tokens {
            chat = chat.max_tokens(max_tokens);
        }
        if llm.json_mode {
            chat = chat.json_mode();
        }
        chat
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, request: &ExtractionRequest, chunk: &Chunk) -> Result<String> {
        let (client, provider) = self.client(request)?;
        let chat = Self::chat_request(request, &provider, chunk);

        debug!(
            provider = %provider,
            base_url = client.base_url(),
            chunk = chunk.index + 1,
            total = chunk.total,
            "Calling model"
        );

        let response = client
            .chat_completion(chat)
            .await
            .map_err(to_scrape_error)?;

        if response.is_truncated() {
            warn!(
                chunk = chunk.index + 1,
                "Model reply hit the output token limit; JSON may be incomplete"
            );
        }
        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }

        Ok(strip_code_fence(&response.content).to_string())
    }

    fn name(&self) -> &str {
        "llm"
    }
}

fn to_scrape_error(error: LlmError) -> ScrapeError {
    match error {
        LlmError::Config(message) => ScrapeError::Config(message),
        other => ScrapeError::Extraction(other.to_string()),
    }
}
