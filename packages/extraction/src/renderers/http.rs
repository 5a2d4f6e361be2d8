//! Plain HTTP renderer.
//!
//! Fetches the page with reqwest and converts the HTML to text. No script is
//! executed, so this suits server-rendered pages; use the Chromium renderer
//! (feature `browser`) for pages built client-side.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::renderers::html::html_to_text;
use crate::traits::renderer::{RenderSession, Renderer};
use crate::types::config::BrowserOptions;
use crate::types::page::RenderedPage;

/// Renderer backed by a plain HTTP GET.
///
/// # Example
///
/// ```rust,ignore
/// use extraction::renderers::HttpRenderer;
/// use extraction::traits::renderer::render_in_session;
///
/// let page = render_in_session(&HttpRenderer::new(), url, &options).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpRenderer;

impl HttpRenderer {
    pub fn new() -> Self {
        Self
    }

    fn build_client(options: &BrowserOptions) -> FetchResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        if options.bypass_cache() {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }

        reqwest::Client::builder()
            .timeout(options.page_timeout)
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn open(&self, options: &BrowserOptions) -> FetchResult<Box<dyn RenderSession>> {
        if options.javascript_enabled {
            warn!("JavaScript was requested but the HTTP renderer does not run scripts; use the chromium renderer for client-rendered pages");
        }
        if !options.headless {
            warn!("The HTTP renderer has no browser window; headed mode is ignored");
        }

        let client = Self::build_client(options)?;

        Ok(Box::new(HttpSession {
            client,
            options: options.clone(),
        }))
    }

    fn name(&self) -> &str {
        "http"
    }
}

struct HttpSession {
    client: reqwest::Client,
    options: BrowserOptions,
}

impl HttpSession {
    fn map_send_error(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.options.page_timeout.as_millis() as u64,
            }
        } else if error.is_builder() {
            FetchError::InvalidUrl {
                url: url.to_string(),
            }
        } else {
            FetchError::Http(Box::new(error))
        }
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn render(&mut self, url: &str) -> FetchResult<RenderedPage> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            self.map_send_error(url, e)
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let html = response
            .text()
            .await
            .map_err(|e| self.map_send_error(url, e))?;

        let text = html_to_text(&html, self.options.remove_overlays);

        let mut page = RenderedPage::new(url, text.text)
            .with_status(status.as_u16())
            .with_html(html)
            .with_metadata("javascript", "not executed");
        if final_url != url {
            page = page.with_final_url(final_url);
        }
        if let Some(title) = text.title {
            page = page.with_title(title);
        }
        if let Some(ct) = content_type {
            page = page.with_metadata("content_type", ct);
        }

        debug!(url = %url, status = status.as_u16(), "HTTP fetch complete");
        Ok(page)
    }

    async fn close(self: Box<Self>) -> FetchResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::renderer::render_in_session;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = "<html><head><title>Catalog</title></head><body>\
        <div class=\"modal\">Sign up!</div><p>COM001 Intro to Programming</p></body></html>";

    fn options() -> BrowserOptions {
        BrowserOptions::default().with_overlay_removal(true)
    }

    #[tokio::test]
    async fn test_renders_page_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .insert_header("content-type", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/catalog", server.uri());
        let page = render_in_session(&HttpRenderer::new(), &url, &options())
            .await
            .unwrap();

        assert_eq!(page.status, Some(200));
        assert_eq!(page.title.as_deref(), Some("Catalog"));
        assert!(page.content.contains("COM001 Intro to Programming"));
        assert!(!page.content.contains("Sign up!"));
        assert!(page.html.as_deref().unwrap_or_default().contains("Sign up!"));
    }

    #[tokio::test]
    async fn test_scripts_are_not_run_and_page_says_so() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><div id=\"app\"></div>\
                 <script>document.getElementById('app').innerText = 'COM001';</script></body></html>",
            ))
            .mount(&server)
            .await;

        let options = BrowserOptions::default();
        assert!(options.javascript_enabled);
        let page = render_in_session(&HttpRenderer::new(), &server.uri(), &options)
            .await
            .unwrap();

        assert!(!page.content.contains("COM001"));
        assert_eq!(
            page.metadata.get("javascript").map(String::as_str),
            Some("not executed")
        );
    }

    #[tokio::test]
    async fn test_cache_bypass_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cache-control", "no-cache"))
            .and(header("pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let options = options().with_cache_mode(crate::types::config::CacheMode::Bypass);
        render_in_session(&HttpRenderer::new(), &server.uri(), &options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = render_in_session(&HttpRenderer::new(), &server.uri(), &options())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_slow_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let options = options().with_page_timeout(Duration::from_millis(100));
        let err = render_in_session(&HttpRenderer::new(), &server.uri(), &options)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout { timeout_ms: 100, .. }));
        assert!(err.to_string().contains("timeout"));
    }
}
