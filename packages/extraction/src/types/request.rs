//! The extraction request and its builder.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::security::ApiCredentials;
use crate::types::config::{BrowserOptions, CacheMode, ChunkingConfig, LlmOptions};
use crate::use_case::UseCase;

/// Everything one run needs. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    url: Url,
    use_case: UseCase,
    credentials: ApiCredentials,
}

impl ExtractionRequest {
    /// Start building a request for `url` with a use case's defaults.
    pub fn builder(url: impl Into<String>, use_case: UseCase) -> RequestBuilder {
        RequestBuilder::new(url, use_case)
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn use_case(&self) -> &UseCase {
        &self.use_case
    }

    pub fn instruction(&self) -> &str {
        &self.use_case.instruction
    }

    pub fn browser(&self) -> &BrowserOptions {
        &self.use_case.browser
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.use_case.chunking
    }

    pub fn llm(&self) -> &LlmOptions {
        &self.use_case.llm
    }

    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }
}

/// Assembles and validates an [`ExtractionRequest`].
///
/// Nothing here touches the network; every problem surfaces as
/// [`ScrapeError::Config`] from [`RequestBuilder::build_with`].
#[derive(Debug)]
pub struct RequestBuilder {
    url: String,
    use_case: UseCase,
    api_token: Option<String>,
}

impl RequestBuilder {
    pub fn new(url: impl Into<String>, use_case: UseCase) -> Self {
        Self {
            url: url.into(),
            use_case,
            api_token: None,
        }
    }

    /// Explicit provider token; wins over the environment.
    pub fn api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.use_case.instruction = instruction.into();
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.use_case.llm.provider = provider.into();
        self
    }

    pub fn base_url(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.use_case.llm.base_url = base_url;
        }
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.use_case.llm.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.use_case.llm.max_tokens = Some(max_tokens);
        self
    }

    pub fn json_mode(mut self, json_mode: bool) -> Self {
        self.use_case.llm.json_mode = json_mode;
        self
    }

    pub fn chunk_token_threshold(mut self, tokens: usize) -> Self {
        self.use_case.chunking.token_threshold = tokens;
        self
    }

    pub fn overlap_rate(mut self, rate: f32) -> Self {
        self.use_case.chunking.overlap_rate = rate;
        self
    }

    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.use_case.browser.page_timeout = timeout;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.use_case.browser.headless = headless;
        self
    }

    pub fn javascript(mut self, enabled: bool) -> Self {
        self.use_case.browser.javascript_enabled = enabled;
        self
    }

    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.use_case.browser.cache_mode = if bypass {
            CacheMode::Bypass
        } else {
            CacheMode::Enabled
        };
        self
    }

    /// Validate and resolve the credential through `lookup` (an environment
    /// reader; tests pass a closure).
    pub fn build_with<F>(self, lookup: F) -> Result<ExtractionRequest>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = ApiCredentials::resolve(self.api_token, lookup)?;

        let url = Url::parse(&self.url)
            .map_err(|e| ScrapeError::Config(format!("invalid URL '{}': {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::Config(format!(
                "unsupported URL scheme '{}' in {}",
                url.scheme(),
                self.url
            )));
        }

        self.use_case.browser.validate()?;
        self.use_case.chunking.validate()?;
        self.use_case.llm.validate()?;

        debug!(
            url = %url,
            use_case = %self.use_case.name,
            provider = %self.use_case.llm.provider,
            "Extraction request built"
        );

        Ok(ExtractionRequest {
            url,
            use_case: self.use_case,
            credentials,
        })
    }

    /// Validate and resolve the credential from the process environment.
    pub fn build(self) -> Result<ExtractionRequest> {
        self.build_with(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn with_key(_: &str) -> Option<String> {
        Some("sk-test".to_string())
    }

    #[test]
    fn test_builds_with_use_case_defaults() {
        let request = ExtractionRequest::builder("https://example.test/catalog", UseCase::course_catalog())
            .build_with(with_key)
            .unwrap();

        assert_eq!(request.url(), "https://example.test/catalog");
        assert_eq!(request.chunking().token_threshold, 2000);
        assert_eq!(request.llm().provider, "deepseek/deepseek-chat");
        assert_eq!(request.credentials().api_key().expose(), "sk-test");
    }

    #[test]
    fn test_overrides_apply() {
        let request = ExtractionRequest::builder("https://example.test", UseCase::product())
            .instruction("Etsi tuotteen nimi, hinta ja ominaisuudet listana")
            .chunk_token_threshold(500)
            .overlap_rate(0.2)
            .page_timeout(Duration::from_secs(5))
            .javascript(false)
            .bypass_cache(true)
            .temperature(0.0)
            .build_with(with_key)
            .unwrap();

        assert!(request.instruction().starts_with("Etsi"));
        assert_eq!(request.chunking().token_threshold, 500);
        assert_eq!(request.browser().page_timeout, Duration::from_secs(5));
        assert!(!request.browser().javascript_enabled);
        assert!(request.browser().bypass_cache());
        assert_eq!(request.llm().temperature, Some(0.0));
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let err = ExtractionRequest::builder("https://example.test", UseCase::course_catalog())
            .build_with(|_| None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_bad_urls() {
        for url in ["not a url", "ftp://example.test/file", "file:///etc/passwd"] {
            let err = ExtractionRequest::builder(url, UseCase::course_catalog())
                .build_with(with_key)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "{url}");
        }
    }

    #[test]
    fn test_rejects_bad_knobs() {
        let err = ExtractionRequest::builder("https://example.test", UseCase::course_catalog())
            .overlap_rate(1.5)
            .build_with(with_key)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
