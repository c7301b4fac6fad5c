//! Fetch session ownership
//!
//! A [`FetchSession`] is the sole owner of the HTTP client and, when one
//! was launched, the browser process. It is released with
//! [`FetchSession::close`], which quits the browser at most once no matter
//! how many times it is called.

use super::{BrowserFetcher, FetchMode, Fetcher, HttpFetcher};
use crate::browser::{BrowserDriver, ChromeDriver, RenderOptions};
use crate::config::ExtractorConfig;
use crate::error::{BrowserError, Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// HTTP client plus optional browser, owned by one extractor
pub struct FetchSession {
    http: Arc<dyn Fetcher>,
    browser: Option<BrowserFetcher>,
    closed: AtomicBool,
}

impl FetchSession {
    /// Open a session; launches Chromium only when `with_browser` is set
    #[instrument(skip(config))]
    pub async fn open(config: &ExtractorConfig, with_browser: bool) -> Result<Self> {
        let http: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config.http_timeout)?);

        let browser: Option<Arc<dyn BrowserDriver>> = if with_browser {
            Some(Arc::new(ChromeDriver::launch(config.browser.clone()).await?))
        } else {
            None
        };

        info!("Fetch session opened (browser={})", with_browser);
        Ok(Self::from_parts(http, browser, config.browser_timeout))
    }

    /// Assemble a session from existing parts
    pub fn from_parts(
        http: Arc<dyn Fetcher>,
        browser: Option<Arc<dyn BrowserDriver>>,
        browser_timeout: Duration,
    ) -> Self {
        Self {
            http,
            browser: browser
                .map(|driver| BrowserFetcher::new(driver, RenderOptions::article(browser_timeout))),
            closed: AtomicBool::new(false),
        }
    }

    /// Whether this session can fetch dynamically
    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Fetch `url` with the given strategy
    pub async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String> {
        self.ensure_open()?;
        match mode {
            FetchMode::Static => self.http.fetch(url).await,
            FetchMode::Dynamic => self.browser()?.fetch(url).await,
        }
    }

    /// Render a page with caller-chosen options (listing pages)
    pub async fn render(&self, url: &str, opts: &RenderOptions) -> Result<String> {
        self.ensure_open()?;
        self.browser()?.driver().render(url, opts).await
    }

    /// Release the session; the browser is quit exactly once
    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let result = match &self.browser {
            Some(browser) => browser.driver().quit().await,
            None => Ok(()),
        };

        match &result {
            Ok(()) => info!("Fetch session released"),
            Err(e) => warn!("Fetch session released with error: {}", e),
        }
        result
    }

    fn browser(&self) -> Result<&BrowserFetcher> {
        self.browser
            .as_ref()
            .ok_or_else(|| BrowserError::NotAvailable.into())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::generic("fetch session is closed"))
        } else {
            Ok(())
        }
    }
}

impl Drop for FetchSession {
    fn drop(&mut self) {
        if self.browser.is_some() && !self.is_closed() {
            warn!("Fetch session dropped without close(); browser process left to its own drop");
        }
    }
}
