//! Page navigation and rendering
//!
//! Navigates a page, waits until the document has a body, optionally lets
//! lazy content settle by scrolling, then serializes the rendered DOM.
//! Retries belong to callers; one call is one navigation attempt.

use crate::browser::PageHandle;
use crate::error::{BrowserError, Error, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// How to render a page before serializing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Bound on navigation plus the body-readiness wait
    pub timeout: Duration,
    /// Sleep after the page is ready, before scrolling
    pub settle: Duration,
    /// Scroll-to-bottom cycles to trigger lazy loading
    pub scroll_cycles: u32,
    /// Sleep after each scroll
    pub scroll_pause: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::article(Duration::from_secs(20))
    }
}

impl RenderOptions {
    /// Article pages: wait for the body, no settle or scrolling
    pub fn article(timeout: Duration) -> Self {
        Self {
            timeout,
            settle: Duration::ZERO,
            scroll_cycles: 0,
            scroll_pause: Duration::ZERO,
        }
    }

    /// Listing pages: long load timeout, settle, three scroll cycles
    pub fn listing() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            settle: Duration::from_secs(10),
            scroll_cycles: 3,
            scroll_pause: Duration::from_secs(3),
        }
    }

    /// Same options with a different settle delay
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Drives a single page through navigation and rendering
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to `url` and return the rendered DOM
    #[instrument(skip(page, opts), fields(timeout_ms = opts.timeout_ms()))]
    pub async fn render(page: &PageHandle, url: &str, opts: &RenderOptions) -> Result<String> {
        let start = Instant::now();
        info!("Navigating to: {}", url);

        Self::goto(page, url, opts).await?;
        Self::wait_for_body(page, opts.timeout.saturating_sub(start.elapsed()), opts).await?;

        if !opts.settle.is_zero() {
            debug!("Settling for {:?}", opts.settle);
            tokio::time::sleep(opts.settle).await;
        }

        for cycle in 0..opts.scroll_cycles {
            debug!("Scroll {}/{}", cycle + 1, opts.scroll_cycles);
            Self::scroll_to_bottom(page).await?;
            tokio::time::sleep(opts.scroll_pause).await;
        }

        let html = page
            .page
            .content()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        debug!(
            "Rendered {} bytes from {} in {}ms",
            html.len(),
            url,
            start.elapsed().as_millis()
        );
        Ok(html)
    }

    async fn goto(page: &PageHandle, url: &str, opts: &RenderOptions) -> Result<()> {
        tokio::time::timeout(opts.timeout, page.page.goto(url))
            .await
            .map_err(|_| BrowserError::NavigationTimeout(opts.timeout_ms()))?
            .map_err(|e| BrowserError::Fault(format!("navigation failed: {}", e)))?;

        let final_url = page
            .page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        if final_url != url {
            debug!("Navigation redirected: {} -> {}", url, final_url);
        }
        page.set_url(final_url).await;
        Ok(())
    }

    /// Wait until `document.body` exists
    async fn wait_for_body(page: &PageHandle, remaining: Duration, opts: &RenderOptions) -> Result<()> {
        let script = format!(
            r#"
                new Promise((resolve, reject) => {{
                    const timeout = {};
                    const start = Date.now();

                    function check() {{
                        if (document.body) {{
                            resolve(true);
                        }} else if (Date.now() - start > timeout) {{
                            reject(new Error('Timeout waiting for body'));
                        }} else {{
                            setTimeout(check, 50);
                        }}
                    }}
                    check();
                }})
            "#,
            remaining.as_millis()
        );

        tokio::time::timeout(remaining, page.page.evaluate(script.as_str()))
            .await
            .map_err(|_| BrowserError::NavigationTimeout(opts.timeout_ms()))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(())
    }

    /// Scroll to the bottom of the document
    async fn scroll_to_bottom(page: &PageHandle) -> Result<()> {
        page.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;
        Ok(())
    }
}
