//! Rendered page content handed from the renderer to the extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page content after rendering.
///
/// `content` is the readable text (markdown-ish) the model sees; `html` is
/// kept for debugging when the renderer has it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    /// URL that was requested
    pub url: String,

    /// URL after redirects, when known
    pub final_url: Option<String>,

    /// HTTP status of the main document, when known
    pub status: Option<u16>,

    /// Readable page text
    pub content: String,

    /// Rendered HTML
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Document title if available
    pub title: Option<String>,

    /// When the page was rendered
    pub fetched_at: DateTime<Utc>,

    /// Renderer-specific metadata (e.g. response headers)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RenderedPage {
    /// Create a rendered page with minimal fields.
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            final_url: None,
            status: None,
            content: content.into(),
            html: None,
            title: None,
            fetched_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A page without a known status counts as successful.
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |s| (200..300).contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_page_builder() {
        let page = RenderedPage::new("https://example.test/catalog", "# Courses")
            .with_status(200)
            .with_final_url("https://www.example.test/catalog")
            .with_title("Catalog")
            .with_metadata("renderer", "http");

        assert!(page.is_success());
        assert_eq!(page.title.as_deref(), Some("Catalog"));
        assert_eq!(page.metadata.get("renderer").map(String::as_str), Some("http"));
    }

    #[test]
    fn test_status_decides_success() {
        assert!(RenderedPage::new("u", "x").is_success());
        assert!(!RenderedPage::new("u", "x").with_status(404).is_success());
        assert!(!RenderedPage::new("u", "x").with_status(503).is_success());
    }
}
