//! Headless Chromium renderer (feature `browser`).
//!
//! Launches one browser per session, so client-side rendered pages are
//! captured after their scripts ran. Requires a Chrome/Chromium executable on
//! the machine.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetScriptExecutionDisabledParams;
use chromiumoxide::cdp::browser_protocol::network::SetCacheDisabledParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::renderers::html::html_to_text;
use crate::traits::renderer::{RenderSession, Renderer};
use crate::types::config::BrowserOptions;
use crate::types::page::RenderedPage;

/// Removes fixed/sticky overlays and dialogs still present after load.
const REMOVE_OVERLAYS_JS: &str = r#"(() => {
  const selectors = ['dialog', '[aria-modal="true"]', '[role="dialog"]', '[role="alertdialog"]',
    '[class*="modal"]', '[class*="overlay"]', '[class*="popup"]', '[class*="cookie"]', '[class*="consent"]'];
  document.querySelectorAll(selectors.join(',')).forEach(el => el.remove());
  document.querySelectorAll('body *').forEach(el => {
    const style = getComputedStyle(el);
    if ((style.position === 'fixed' || style.position === 'sticky') && parseInt(style.zIndex || '0', 10) > 100) {
      el.remove();
    }
  });
  document.body.style.overflow = 'auto';
})()"#;

/// Renderer backed by a launched Chromium.
#[derive(Debug, Clone, Default)]
pub struct ChromiumRenderer {
    no_sandbox: bool,
}

impl ChromiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch without the Chromium sandbox (containers running as root).
    pub fn no_sandbox(mut self) -> Self {
        self.no_sandbox = true;
        self
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self, options: &BrowserOptions) -> FetchResult<Box<dyn RenderSession>> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(options.page_timeout)
            .arg(format!("--user-agent={}", options.user_agent));
        if !options.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder.build().map_err(FetchError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to launch browser: {e}")))?;

        // the handler drives the CDP connection and must be polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        debug!(headless = options.headless, "Browser launched");
        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
            options: options.clone(),
        }))
    }

    fn name(&self) -> &str {
        "chromium"
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    options: BrowserOptions,
}

impl ChromiumSession {
    async fn load(&self, page: &Page, url: &str) -> FetchResult<RenderedPage> {
        if !self.options.javascript_enabled {
            page.execute(SetScriptExecutionDisabledParams::new(true))
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
        }
        if self.options.bypass_cache() {
            page.execute(SetCacheDisabledParams::new(true))
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
        }

        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(self.options.page_timeout, navigation).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(FetchError::Failed(format!("navigation to {url} failed: {e}"))),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    timeout_ms: self.options.page_timeout.as_millis() as u64,
                })
            }
        }

        if self.options.remove_overlays {
            if let Err(e) = page.evaluate(REMOVE_OVERLAYS_JS).await {
                warn!(url = %url, error = %e, "Overlay removal script failed");
            }
        }

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(format!("page.content() failed: {e}")))?;
        let final_url = page.url().await.ok().flatten();
        let title = page.get_title().await.ok().flatten();

        let text = html_to_text(&html, self.options.remove_overlays);
        let mut rendered = RenderedPage::new(url, text.text).with_html(html);
        if let Some(title) = title.or(text.title) {
            rendered = rendered.with_title(title);
        }
        if let Some(final_url) = final_url.filter(|u| u != url) {
            rendered = rendered.with_final_url(final_url);
        }
        Ok(rendered)
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render(&mut self, url: &str) -> FetchResult<RenderedPage> {
        debug!(url = %url, "Browser render starting");
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to open tab: {e}")))?;

        let rendered = self.load(&page, url).await;

        if let Err(e) = page.close().await {
            debug!(error = %e, "Failed to close tab");
        }
        rendered
    }

    async fn close(mut self: Box<Self>) -> FetchResult<()> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed
            .map(|_| ())
            .map_err(|e| FetchError::Browser(format!("failed to close browser: {e}")))
    }
}
