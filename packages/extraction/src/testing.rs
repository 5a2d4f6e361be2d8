//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the extraction library
//! without launching a browser or calling a model.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{FetchError, FetchResult, Result, ScrapeError};
use crate::pipeline::chunking::Chunk;
use crate::traits::{
    extractor::Extractor,
    renderer::{RenderSession, Renderer},
};
use crate::types::{config::BrowserOptions, page::RenderedPage, request::ExtractionRequest};

/// A mock renderer with call counters.
///
/// Clones share counters, so a test can keep a handle after moving the
/// renderer into a [`crate::Scraper`].
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    page: Option<RenderedPage>,
    render_error: Option<String>,
    open_error: Option<String>,
    opens: Arc<AtomicUsize>,
    renders: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    rendered_urls: Arc<RwLock<Vec<String>>>,
    seen_options: Arc<RwLock<Vec<BrowserOptions>>>,
}

impl MockRenderer {
    /// A renderer that returns an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this page for every render.
    pub fn with_page(mut self, page: RenderedPage) -> Self {
        self.page = Some(page);
        self
    }

    /// Fail every render with this message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.render_error = Some(message.into());
        self
    }

    /// Fail to open a session (e.g. browser launch failure).
    pub fn with_open_error(mut self, message: impl Into<String>) -> Self {
        self.open_error = Some(message.into());
        self
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Total calls of any kind; zero means the renderer was never touched.
    pub fn call_count(&self) -> usize {
        self.open_count() + self.render_count() + self.close_count()
    }

    pub fn rendered_urls(&self) -> Vec<String> {
        self.rendered_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Options passed to each `open`.
    pub fn seen_options(&self) -> Vec<BrowserOptions> {
        self.seen_options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn open(&self, options: &BrowserOptions) -> FetchResult<Box<dyn RenderSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.seen_options
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options.clone());

        if let Some(message) = &self.open_error {
            return Err(FetchError::Browser(message.clone()));
        }
        Ok(Box::new(MockSession {
            renderer: self.clone(),
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct MockSession {
    renderer: MockRenderer,
}

#[async_trait]
impl RenderSession for MockSession {
    async fn render(&mut self, url: &str) -> FetchResult<RenderedPage> {
        let renderer = &self.renderer;
        renderer.renders.fetch_add(1, Ordering::SeqCst);
        renderer
            .rendered_urls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        if let Some(message) = &renderer.render_error {
            return Err(FetchError::Failed(message.clone()));
        }
        Ok(renderer
            .page
            .clone()
            .unwrap_or_else(|| RenderedPage::new(url, "")))
    }

    async fn close(self: Box<Self>) -> FetchResult<()> {
        self.renderer.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock extractor returning canned replies in call order.
///
/// Call `n` gets the `n`th reply; once replies run out the last one repeats.
/// Without replies every call returns `[]`.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    replies: Vec<String>,
    error: Option<String>,
    config_error: Option<String>,
    calls: Arc<RwLock<Vec<MockExtractorCall>>>,
}

/// Record of a call made to the mock extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockExtractorCall {
    pub url: String,
    pub instruction: String,
    pub index: usize,
    pub total: usize,
    pub text: String,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.replies.push(reply.into());
        self
    }

    /// Fail every call with [`ScrapeError::Extraction`].
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Fail every call with [`ScrapeError::Config`], as a client that
    /// cannot be built would.
    pub fn with_config_error(mut self, message: impl Into<String>) -> Self {
        self.config_error = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, request: &ExtractionRequest, chunk: &Chunk) -> Result<String> {
        let call_index = {
            let mut calls = self.calls.write().unwrap_or_else(PoisonError::into_inner);
            calls.push(MockExtractorCall {
                url: request.url().to_string(),
                instruction: request.instruction().to_string(),
                index: chunk.index,
                total: chunk.total,
                text: chunk.text.clone(),
            });
            calls.len() - 1
        };

        if let Some(message) = &self.config_error {
            return Err(ScrapeError::Config(message.clone()));
        }
        if let Some(message) = &self.error {
            return Err(ScrapeError::Extraction(message.clone()));
        }

        Ok(self
            .replies
            .get(call_index)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_else(|| "[]".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::renderer::render_in_session;

    #[tokio::test]
    async fn test_mock_renderer_counts_and_shares_state() {
        let renderer = MockRenderer::new().with_page(RenderedPage::new("https://a.test", "hello"));
        let handle = renderer.clone();

        let page = render_in_session(&renderer, "https://a.test", &BrowserOptions::default())
            .await
            .unwrap();

        assert_eq!(page.content, "hello");
        assert_eq!(handle.open_count(), 1);
        assert_eq!(handle.render_count(), 1);
        assert_eq!(handle.close_count(), 1);
        assert_eq!(handle.rendered_urls(), vec!["https://a.test".to_string()]);
    }

    #[tokio::test]
    async fn test_open_error_skips_render_and_close() {
        let renderer = MockRenderer::new().with_open_error("no chrome");

        let err = render_in_session(&renderer, "https://a.test", &BrowserOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Browser(_)));
        assert_eq!(renderer.render_count(), 0);
        assert_eq!(renderer.close_count(), 0);
    }
}
