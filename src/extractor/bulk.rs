//! Bulk extraction from a listing page
//!
//! A run moves through
//! `Idle -> LoadingListing -> Discovering -> ExtractingArticle(i) -> Completed`,
//! or ends in `Failed` from any stage. Whatever results were collected
//! before a failure are still returned, and the fetch session is released
//! exactly once when the run ends, however it ends.

use super::{panic_message, DomainLimiter, SingleExtractor};
use crate::config::{BulkConfig, ExtractorConfig, SiteProfile};
use crate::error::{BulkError, Result};
use crate::extraction::LinkDiscoverer;
use crate::model::{BulkOutcome, BulkReport, ExtractionResult, NewsLink};
use crate::output::{ArticleStore, FileNaming};
use futures::{FutureExt, StreamExt};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};

/// Error recorded for an article cut off by the batch deadline
const DEADLINE_MESSAGE: &str = "batch deadline exceeded";

/// Stage of a bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkState {
    /// Not started
    Idle,
    /// Navigating to a listing page
    LoadingListing,
    /// Reading article links off a rendered listing
    Discovering,
    /// Extracting the article at this discovery index
    ExtractingArticle(usize),
    /// Every discovered link was attempted
    Completed,
    /// The run ended early
    Failed,
}

impl fmt::Display for BulkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkState::Idle => f.write_str("idle"),
            BulkState::LoadingListing => f.write_str("loading listing"),
            BulkState::Discovering => f.write_str("discovering"),
            BulkState::ExtractingArticle(i) => write!(f, "extracting article {}", i),
            BulkState::Completed => f.write_str("completed"),
            BulkState::Failed => f.write_str("failed"),
        }
    }
}

fn enter(state: BulkState) {
    debug!("Bulk state -> {}", state);
}

/// Results gathered so far, indexed by discovery order
#[derive(Default)]
struct Progress {
    listing_url: Option<String>,
    links: Vec<NewsLink>,
    started: Vec<bool>,
    slots: Vec<Option<ExtractionResult>>,
    saved: Vec<Option<PathBuf>>,
}

impl Progress {
    fn begin(&mut self, listing_url: &str, links: &[NewsLink]) {
        self.listing_url = Some(listing_url.to_string());
        self.links = links.to_vec();
        self.started = vec![false; links.len()];
        self.slots = vec![None; links.len()];
        self.saved = vec![None; links.len()];
    }

    fn start(&mut self, index: usize) {
        if let Some(flag) = self.started.get_mut(index) {
            *flag = true;
        }
    }

    fn saved(&mut self, index: usize, path: PathBuf) {
        if let Some(slot) = self.saved.get_mut(index) {
            *slot = Some(path);
        }
    }

    fn record(&mut self, index: usize, result: ExtractionResult) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(result);
        }
    }

    /// Results and saved paths in discovery order. Articles still in flight
    /// when the run was interrupted get a failure carrying `interrupted`.
    fn finish(self, interrupted: Option<&str>) -> (Vec<ExtractionResult>, Option<String>, Vec<PathBuf>) {
        let Progress {
            listing_url,
            links,
            started,
            slots,
            saved,
        } = self;

        let results = slots
            .into_iter()
            .zip(started)
            .zip(links)
            .filter_map(|((slot, started), link)| match (slot, interrupted) {
                (Some(result), _) => Some(result),
                (None, Some(reason)) if started => Some(ExtractionResult::failure(link.url, reason)),
                _ => None,
            })
            .collect();
        let saved_files = saved.into_iter().flatten().collect();

        (results, listing_url, saved_files)
    }
}

fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Discovers articles on a listing page and extracts each of them.
///
/// Owns a [`SingleExtractor`] and therefore its fetch session; running the
/// extractor consumes it and releases the session.
pub struct BulkExtractor {
    extractor: SingleExtractor,
    config: BulkConfig,
    profile: SiteProfile,
    discoverer: LinkDiscoverer,
    store: Option<ArticleStore>,
}

impl BulkExtractor {
    /// Launch a browser-backed extractor for `profile`
    pub async fn new(
        config: BulkConfig,
        profile: SiteProfile,
        extractor_config: ExtractorConfig,
    ) -> Result<Self> {
        let extractor = SingleExtractor::new(extractor_config, true).await?;
        Ok(Self::with_extractor(extractor, config, profile))
    }

    /// Wrap an existing single extractor
    pub fn with_extractor(extractor: SingleExtractor, config: BulkConfig, profile: SiteProfile) -> Self {
        let discoverer = LinkDiscoverer::from_profile(&profile);
        let store = config.save_dir.clone().map(ArticleStore::new);
        Self {
            extractor,
            config,
            profile,
            discoverer,
            store,
        }
    }

    /// Bulk configuration
    pub fn config(&self) -> &BulkConfig {
        &self.config
    }

    /// Target site
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Extract up to `max_articles` articles linked from `listing_url`.
    ///
    /// Returns results in discovery order; empty when no listing page
    /// could be loaded. Never fails.
    pub async fn extract_all(self, listing_url: &str, max_articles: usize) -> Vec<ExtractionResult> {
        self.run(listing_url, max_articles).await.into_results()
    }

    /// Like [`extract_all`](Self::extract_all), keeping the outcome, the
    /// listing actually used and the saved file paths
    #[instrument(skip(self), fields(site = %self.profile.name))]
    pub async fn run(self, listing_url: &str, max_articles: usize) -> BulkReport {
        enter(BulkState::Idle);
        let progress = Mutex::new(Progress::default());

        let (outcome, interrupted) = {
            let stages = AssertUnwindSafe(self.stages(listing_url, max_articles, &progress)).catch_unwind();
            let staged = match self.config.deadline {
                Some(limit) => match tokio::time::timeout(limit, stages).await {
                    Ok(staged) => staged,
                    Err(_) => {
                        warn!("Bulk run hit its {:?} deadline; keeping partial results", limit);
                        Ok(BulkOutcome::DeadlineExceeded)
                    }
                },
                None => stages.await,
            };

            match staged {
                Ok(BulkOutcome::DeadlineExceeded) => {
                    (BulkOutcome::DeadlineExceeded, Some(DEADLINE_MESSAGE.to_string()))
                }
                Ok(outcome) => (outcome, None),
                Err(panic) => {
                    let message = panic_message(panic);
                    error!("Bulk run panicked: {}", message);
                    (BulkOutcome::Panicked, Some(message))
                }
            }
        };

        enter(match outcome {
            BulkOutcome::Completed => BulkState::Completed,
            _ => BulkState::Failed,
        });

        if let Err(e) = self.extractor.close().await {
            warn!("Fetch session release reported an error: {}", e);
        }

        let progress = progress.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (results, listing_url, saved_files) = progress.finish(interrupted.as_deref());
        let report = BulkReport {
            results,
            outcome,
            listing_url,
            saved_files,
        };

        info!("Bulk run finished: {}", report);
        report
    }

    async fn stages(&self, listing_url: &str, max_articles: usize, progress: &Mutex<Progress>) -> BulkOutcome {
        if max_articles == 0 {
            info!("Article cap is zero; nothing to extract");
            return BulkOutcome::Completed;
        }

        let Some((used_url, links)) = self.load_listing(listing_url, max_articles).await else {
            return BulkOutcome::ListingLoadFailed;
        };

        info!("Discovered {} article links on {}", links.len(), used_url);
        lock(progress).begin(&used_url, &links);

        if self.config.workers > 1 {
            self.extract_pooled(&links, progress).await;
        } else {
            self.extract_sequential(&links, progress).await;
        }

        BulkOutcome::Completed
    }

    /// Load the primary listing with retries, then each alternate once.
    /// A listing counts as loaded only if it yields at least one link.
    async fn load_listing(&self, listing_url: &str, max_articles: usize) -> Option<(String, Vec<NewsLink>)> {
        let session = self.extractor.session();
        let retries = self.config.listing_retries.max(1);
        let mut attempts = 0u32;

        enter(BulkState::LoadingListing);
        for attempt in 1..=retries {
            attempts += 1;
            match session.render(listing_url, &self.config.listing_render).await {
                Ok(html) => {
                    if let Some(links) = self.discover(&html, listing_url, max_articles) {
                        return Some((listing_url.to_string(), links));
                    }
                    warn!("No article links on {}", listing_url);
                    break;
                }
                Err(e) => {
                    warn!(
                        "Listing load attempt {}/{} for {} failed: {}",
                        attempt, retries, listing_url, e
                    );
                    let backoff = self.config.retry_backoff * attempt;
                    if attempt < retries && !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        let alternate_render = self
            .config
            .listing_render
            .clone()
            .with_settle(self.config.alternate_settle);

        for alternate in self
            .profile
            .alternate_urls
            .iter()
            .filter(|url| url.as_str() != listing_url)
        {
            attempts += 1;
            enter(BulkState::LoadingListing);
            info!("Trying alternate listing {}", alternate);

            match session.render(alternate, &alternate_render).await {
                Ok(html) => {
                    if let Some(links) = self.discover(&html, alternate, max_articles) {
                        return Some((alternate.clone(), links));
                    }
                    warn!("No article links on {}", alternate);
                }
                Err(e) => warn!("Alternate listing {} failed: {}", alternate, e),
            }
        }

        error!("{}", BulkError::ListingLoadFailed { attempts });
        None
    }

    fn discover(&self, html: &str, page_url: &str, max_articles: usize) -> Option<Vec<NewsLink>> {
        enter(BulkState::Discovering);
        match self.discoverer.discover(html, page_url, max_articles) {
            Ok(links) if !links.is_empty() => Some(links),
            Ok(_) => None,
            Err(e) => {
                warn!("Link discovery failed on {}: {}", page_url, e);
                None
            }
        }
    }

    async fn extract_sequential(&self, links: &[NewsLink], progress: &Mutex<Progress>) {
        for (index, link) in links.iter().enumerate() {
            if index > 0 && !self.config.politeness_delay.is_zero() {
                tokio::time::sleep(self.config.politeness_delay).await;
            }
            self.extract_one(index, links.len(), link, progress).await;
        }
    }

    async fn extract_pooled(&self, links: &[NewsLink], progress: &Mutex<Progress>) {
        let limiter = DomainLimiter::new(self.config.politeness_delay).with_site(&self.profile.domain);
        info!(
            "Extracting {} articles with {} workers",
            links.len(),
            self.config.workers
        );

        futures::stream::iter(links.iter().enumerate())
            .map(|(index, link)| {
                let limiter = &limiter;
                async move {
                    match limiter.acquire(&link.url).await {
                        Ok(_permit) => {
                            self.extract_one(index, links.len(), link, progress).await;
                            limiter.pause().await;
                        }
                        Err(e) => {
                            lock(progress).record(index, ExtractionResult::failure(&link.url, e.result_message()));
                        }
                    }
                }
            })
            .buffer_unordered(self.config.workers)
            .collect::<Vec<()>>()
            .await;
    }

    async fn extract_one(&self, index: usize, total: usize, link: &NewsLink, progress: &Mutex<Progress>) {
        enter(BulkState::ExtractingArticle(index));
        info!("[{}/{}] {}", index + 1, total, link.title);
        lock(progress).start(index);

        let result = self
            .extractor
            .extract_unsaved(&link.url, self.config.article_mode)
            .await;

        if result.is_success() {
            if let Some(store) = &self.store {
                match store.save(&result, FileNaming::Titled(&link.title)).await {
                    Ok(path) => {
                        lock(progress).saved(index, path);
                    }
                    Err(e) => warn!("Could not save {}: {}", link.url, e),
                }
            }
        } else {
            warn!(
                "[{}/{}] failed: {}",
                index + 1,
                total,
                result.error().unwrap_or_default()
            );
        }

        lock(progress).record(index, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(n: usize) -> NewsLink {
        NewsLink {
            url: format!("https://example.com/news/{}", n),
            title: format!("Headline {}", n),
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(BulkState::ExtractingArticle(2).to_string(), "extracting article 2");
        assert_eq!(BulkState::LoadingListing.to_string(), "loading listing");
    }

    #[test]
    fn test_progress_keeps_discovery_order() {
        let mut progress = Progress::default();
        let links: Vec<_> = (0..3).map(link).collect();
        progress.begin("https://example.com/news", &links);

        progress.start(2);
        progress.record(2, ExtractionResult::failure(&links[2].url, "page load timeout"));
        progress.start(0);
        progress.record(0, ExtractionResult::failure(&links[0].url, "page load timeout"));

        let (results, listing, _) = progress.finish(None);
        let urls: Vec<&str> = results.iter().map(|r| r.url()).collect();
        assert_eq!(urls, vec![links[0].url.as_str(), links[2].url.as_str()]);
        assert_eq!(listing.as_deref(), Some("https://example.com/news"));
    }

    #[test]
    fn test_saved_files_follow_discovery_order() {
        let mut progress = Progress::default();
        let links: Vec<_> = (0..3).map(link).collect();
        progress.begin("https://example.com/news", &links);

        progress.saved(2, PathBuf::from("out/Headline_2.txt"));
        progress.saved(0, PathBuf::from("out/Headline_0.txt"));

        let (_, _, saved) = progress.finish(None);
        assert_eq!(
            saved,
            vec![PathBuf::from("out/Headline_0.txt"), PathBuf::from("out/Headline_2.txt")]
        );
    }

    #[test]
    fn test_interrupted_in_flight_articles_fail() {
        let mut progress = Progress::default();
        let links: Vec<_> = (0..3).map(link).collect();
        progress.begin("https://example.com/news", &links);

        progress.start(0);
        progress.record(0, ExtractionResult::failure(&links[0].url, "driver error: x"));
        progress.start(1);

        let (results, _, _) = progress.finish(Some(DEADLINE_MESSAGE));
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].error(), Some(DEADLINE_MESSAGE));
    }
}
