//! Tunable knobs for rendering, chunking and the model call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Default model, written `provider/model`.
pub const DEFAULT_PROVIDER: &str = "deepseek/deepseek-chat";

/// Whether the renderer may serve a cached copy of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    #[default]
    Enabled,
    /// Always fetch a fresh copy.
    Bypass,
}

/// Options handed to the page renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Run the browser without a visible window.
    pub headless: bool,

    /// Execute the page's scripts before reading content.
    pub javascript_enabled: bool,

    /// Upper bound on page load.
    #[serde(with = "duration_ms")]
    pub page_timeout: Duration,

    /// Strip modal dialogs, cookie banners and similar overlays.
    pub remove_overlays: bool,

    pub cache_mode: CacheMode,

    pub user_agent: String,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            javascript_enabled: true,
            page_timeout: Duration::from_secs(60),
            remove_overlays: false,
            cache_mode: CacheMode::Enabled,
            user_agent: "Mozilla/5.0 (compatible; CatalogScraper/0.1)".to_string(),
        }
    }
}

impl BrowserOptions {
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_overlay_removal(mut self, remove: bool) -> Self {
        self.remove_overlays = remove;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn bypass_cache(&self) -> bool {
        self.cache_mode == CacheMode::Bypass
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_timeout.is_zero() {
            return Err(ScrapeError::Config("page timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

/// How page text is cut into pieces for the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Estimated token budget per chunk.
    pub token_threshold: usize,

    /// Fraction of the budget repeated from the end of the previous chunk.
    pub overlap_rate: f32,

    /// Blocks of page text with fewer words are dropped.
    pub min_block_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            token_threshold: 2000,
            overlap_rate: 0.1,
            min_block_words: 1,
        }
    }
}

/// Largest accepted chunk budget, well past any model context window.
pub const MAX_TOKEN_THRESHOLD: usize = 1_000_000;

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.token_threshold == 0 {
            return Err(ScrapeError::Config("chunk token threshold must be greater than zero".into()));
        }
        if self.token_threshold > MAX_TOKEN_THRESHOLD {
            return Err(ScrapeError::Config(format!(
                "chunk token threshold must be at most {MAX_TOKEN_THRESHOLD}, got {}",
                self.token_threshold
            )));
        }
        if !(0.0..1.0).contains(&self.overlap_rate) {
            return Err(ScrapeError::Config(format!(
                "chunk overlap must be in [0, 1), got {}",
                self.overlap_rate
            )));
        }
        Ok(())
    }
}

/// Providers with a built-in endpoint; any other needs `base_url`.
pub const KNOWN_PROVIDERS: &[&str] = &["deepseek", "openai"];

/// Settings for the model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmOptions {
    /// `provider/model`, e.g. `deepseek/deepseek-chat`.
    pub provider: String,

    /// Endpoint override; known providers have a default.
    pub base_url: Option<String>,

    pub temperature: Option<f32>,

    pub max_tokens: Option<u32>,

    /// Ask the provider for a single JSON object reply.
    pub json_mode: bool,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            json_mode: false,
        }
    }
}

impl LlmOptions {
    pub fn validate(&self) -> Result<()> {
        let name = match self.provider.split_once('/') {
            Some((name, model)) if !name.trim().is_empty() && !model.trim().is_empty() => name.trim(),
            _ => {
                return Err(ScrapeError::Config(format!(
                    "provider must look like 'provider/model', got '{}'",
                    self.provider
                )))
            }
        };
        if self.base_url.is_none() && !KNOWN_PROVIDERS.contains(&name) {
            return Err(ScrapeError::Config(format!(
                "no base URL known for provider '{name}'; pass one explicitly"
            )));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ScrapeError::Config(format!("temperature must be in [0, 2], got {t}")));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ScrapeError::Config("max tokens must be greater than zero".into()));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
