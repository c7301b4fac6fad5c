//! Browser driver abstraction
//!
//! The extractor never talks to chromiumoxide directly. It renders pages
//! through [`BrowserDriver`], which [`ChromeDriver`] implements over one
//! Chromium tab and tests implement in memory.

use crate::browser::{BrowserConfig, BrowserController, PageHandle, PageNavigator, RenderOptions};
use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// A headless browser able to render pages
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to `url`, wait for readiness, and return the rendered DOM
    async fn render(&self, url: &str, opts: &RenderOptions) -> Result<String>;

    /// Terminate the browser process
    async fn quit(&self) -> Result<()>;
}

struct ChromeTab {
    controller: BrowserController,
    page: PageHandle,
}

/// A Chromium process driven through a single tab.
///
/// The tab is behind a mutex held for a whole render, so concurrent callers
/// queue instead of interleaving navigations.
pub struct ChromeDriver {
    tab: Mutex<Option<ChromeTab>>,
}

impl ChromeDriver {
    /// Launch Chromium and open the working tab
    #[instrument(skip(config))]
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let controller = BrowserController::with_config(config).await?;
        let page = match controller.new_page().await {
            Ok(page) => page,
            Err(e) => {
                let _ = controller.close().await;
                return Err(e);
            }
        };

        Ok(Self {
            tab: Mutex::new(Some(ChromeTab { controller, page })),
        })
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn render(&self, url: &str, opts: &RenderOptions) -> Result<String> {
        let guard = self.tab.lock().await;
        let tab = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;
        PageNavigator::render(&tab.page, url, opts).await
    }

    async fn quit(&self) -> Result<()> {
        let tab = self.tab.lock().await.take();
        match tab {
            Some(tab) => {
                info!("Quitting browser (last page: {})", tab.page.url().await);
                tab.controller.close().await
            }
            None => Err(BrowserError::AlreadyClosed.into()),
        }
    }
}
