//! Dynamic fetching through a headless browser

use super::{validate_url, FetchMode, Fetcher};
use crate::browser::{BrowserDriver, RenderOptions};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Renders article pages through a [`BrowserDriver`]
#[derive(Clone)]
pub struct BrowserFetcher {
    driver: Arc<dyn BrowserDriver>,
    opts: RenderOptions,
}

impl BrowserFetcher {
    /// Fetch through `driver` with article render options
    pub fn new(driver: Arc<dyn BrowserDriver>, opts: RenderOptions) -> Self {
        Self { driver, opts }
    }

    /// The underlying driver, for rendering non-article pages
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    fn mode(&self) -> FetchMode {
        FetchMode::Dynamic
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        validate_url(url)?;
        let html = self.driver.render(url, &self.opts).await?;
        debug!("Rendered {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
