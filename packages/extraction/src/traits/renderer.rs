//! Renderer trait: turn a URL into readable page content.
//!
//! Rendering happens inside a session (for a browser: one launched browser
//! process). Sessions are opened per run and must be closed on every path;
//! [`render_in_session`] does that for callers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use extraction::traits::renderer::{render_in_session, Renderer};
//!
//! let renderer = HttpRenderer::new();
//! let page = render_in_session(&renderer, "https://example.com", &options).await?;
//! ```

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::types::config::BrowserOptions;
use crate::types::page::RenderedPage;

/// A source of rendering sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Acquire a session configured by `options`.
    async fn open(&self, options: &BrowserOptions) -> FetchResult<Box<dyn RenderSession>>;

    /// Get the renderer name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

/// One acquired rendering resource.
#[async_trait]
pub trait RenderSession: Send {
    /// Load `url` and return its content.
    async fn render(&mut self, url: &str) -> FetchResult<RenderedPage>;

    /// Release the session. Called exactly once.
    async fn close(self: Box<Self>) -> FetchResult<()>;
}

/// Open a session, render one page, and close the session whatever happened.
///
/// A page with a non-success status is turned into [`FetchError::Status`].
pub async fn render_in_session<R: Renderer + ?Sized>(
    renderer: &R,
    url: &str,
    options: &BrowserOptions,
) -> FetchResult<RenderedPage> {
    let mut session = renderer.open(options).await?;
    debug!(renderer = renderer.name(), url = %url, "Render session opened");

    let rendered = session.render(url).await;

    if let Err(e) = session.close().await {
        warn!(renderer = renderer.name(), error = %e, "Failed to close render session");
    } else {
        debug!(renderer = renderer.name(), "Render session closed");
    }

    let page = rendered?;
    match page.status {
        Some(status) if !page.is_success() => Err(FetchError::Status {
            url: url.to_string(),
            status,
        }),
        _ => Ok(page),
    }
}
