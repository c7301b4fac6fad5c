//! Single-URL extraction

use super::panic_message;
use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::extraction::ContentLocator;
use crate::fetch::{FetchMode, FetchSession};
use crate::model::{ArticleFields, ExtractionResult};
use crate::output::{ArticleStore, FileNaming};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

/// Fetches one URL and turns it into an [`ExtractionResult`].
///
/// Owns its [`FetchSession`]; call [`close`](Self::close) when done.
pub struct SingleExtractor {
    session: FetchSession,
    config: ExtractorConfig,
    locator: ContentLocator,
    store: ArticleStore,
}

impl SingleExtractor {
    /// Open a session and build an extractor.
    ///
    /// A browser is launched only when `with_browser` is set; dynamic
    /// extraction needs one.
    pub async fn new(config: ExtractorConfig, with_browser: bool) -> Result<Self> {
        let session = FetchSession::open(&config, with_browser).await?;
        Ok(Self::with_session(session, config))
    }

    /// Build an extractor around an existing session
    pub fn with_session(session: FetchSession, config: ExtractorConfig) -> Self {
        let store = ArticleStore::new(config.output_dir.clone());
        Self {
            session,
            config,
            locator: ContentLocator::default(),
            store,
        }
    }

    /// Use a custom content locator
    pub fn with_locator(mut self, locator: ContentLocator) -> Self {
        self.locator = locator;
        self
    }

    /// The owned fetch session
    pub fn session(&self) -> &FetchSession {
        &self.session
    }

    /// Extractor configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract `url` with the given fetch mode.
    ///
    /// Never fails: timeouts, browser faults, missing articles and even
    /// panics come back as a failed result. When persistence is enabled a
    /// successful result is also written to the output directory; a write
    /// error is logged and does not change the result.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str, mode: FetchMode) -> ExtractionResult {
        let result = self.extract_unsaved(url, mode).await;

        if self.config.save_to_file && result.is_success() {
            if let Err(e) = self.save(&result, FileNaming::Timestamped).await {
                warn!("Could not save article from {}: {}", url, e);
            }
        }

        result
    }

    /// Persist a successful result under the configured output directory
    pub async fn save(&self, result: &ExtractionResult, naming: FileNaming<'_>) -> Result<PathBuf> {
        self.store.save(result, naming).await
    }

    /// Release the session and its browser
    pub async fn close(self) -> Result<()> {
        self.session.close().await
    }

    pub(crate) async fn extract_unsaved(&self, url: &str, mode: FetchMode) -> ExtractionResult {
        info!("Extracting {} ({})", url, mode);

        match AssertUnwindSafe(self.fetch_and_locate(url, mode))
            .catch_unwind()
            .await
        {
            Ok(Ok(fields)) => {
                let result = ExtractionResult::from_fields(url, fields);
                info!(
                    "Extracted '{}' ({} chars) from {}",
                    result.title(),
                    result.text().chars().count(),
                    url
                );
                result
            }
            Ok(Err(e)) => {
                warn!("Extraction failed for {}: {}", url, e);
                ExtractionResult::failure(url, e.result_message())
            }
            Err(panic) => {
                let message = panic_message(panic);
                error!("Extraction panicked for {}: {}", url, message);
                ExtractionResult::failure(url, message)
            }
        }
    }

    async fn fetch_and_locate(&self, url: &str, mode: FetchMode) -> Result<ArticleFields> {
        let html = self.session.fetch(url, mode).await?;
        self.locator.locate(&html)
    }
}
