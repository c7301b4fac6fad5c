//! Extractor configuration
//!
//! Plain structs with defaults and consuming builders. [`SiteProfile`] is
//! also serde-loadable so a bulk target can be described in a JSON file.

use crate::browser::{BrowserConfig, RenderOptions};
use crate::error::Result;
use crate::fetch::FetchMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory for persisted articles
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_articles";

/// Configuration for a [`SingleExtractor`](crate::extractor::SingleExtractor)
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Timeout for a static HTTP fetch (default: 30s)
    pub http_timeout: Duration,
    /// Timeout for a browser navigation (default: 20s)
    pub browser_timeout: Duration,
    /// Write each successful result to `output_dir` (default: false)
    pub save_to_file: bool,
    /// Where persisted articles go
    pub output_dir: PathBuf,
    /// Browser launch settings, used when the session needs a browser
    pub browser: BrowserConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            browser_timeout: Duration::from_secs(20),
            save_to_file: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            browser: BrowserConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Create a new config builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }
}

/// Builder for ExtractorConfig
#[derive(Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Set the static fetch timeout
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// Set the browser navigation timeout
    pub fn browser_timeout(mut self, timeout: Duration) -> Self {
        self.config.browser_timeout = timeout;
        self
    }

    /// Persist successful results under `dir`
    pub fn save_to<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.save_to_file = true;
        self.config.output_dir = dir.into();
        self
    }

    /// Set browser launch settings
    pub fn browser(mut self, browser: BrowserConfig) -> Self {
        self.config.browser = browser;
        self
    }

    /// Build the config
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

/// Configuration for a [`BulkExtractor`](crate::extractor::BulkExtractor)
#[derive(Debug, Clone)]
pub struct BulkConfig {
    /// Cap on discovered links and extracted articles (default: 10)
    pub max_articles: usize,
    /// Attempts at loading the primary listing (default: 3)
    pub listing_retries: u32,
    /// Navigation, settle and scroll settings for listing pages
    pub listing_render: RenderOptions,
    /// Linear backoff unit between listing attempts (default: 5s)
    pub retry_backoff: Duration,
    /// Settle delay after loading an alternate listing (default: 5s)
    pub alternate_settle: Duration,
    /// Sleep between article fetches against one site (default: 3s)
    pub politeness_delay: Duration,
    /// Concurrent article workers; 1 keeps the run sequential (default: 1)
    pub workers: usize,
    /// Overall batch deadline (default: 15 minutes)
    pub deadline: Option<Duration>,
    /// Fetch mode for article pages (default: dynamic)
    pub article_mode: FetchMode,
    /// Write successful articles here, named after their titles
    pub save_dir: Option<PathBuf>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_articles: 10,
            listing_retries: 3,
            listing_render: RenderOptions::listing(),
            retry_backoff: Duration::from_secs(5),
            alternate_settle: Duration::from_secs(5),
            politeness_delay: Duration::from_secs(3),
            workers: 1,
            deadline: Some(Duration::from_secs(15 * 60)),
            article_mode: FetchMode::Dynamic,
            save_dir: None,
        }
    }
}

impl BulkConfig {
    /// Create a new config builder
    pub fn builder() -> BulkConfigBuilder {
        BulkConfigBuilder::default()
    }
}

/// Builder for BulkConfig
#[derive(Default)]
pub struct BulkConfigBuilder {
    config: BulkConfig,
}

impl BulkConfigBuilder {
    /// Set the article cap
    pub fn max_articles(mut self, max: usize) -> Self {
        self.config.max_articles = max;
        self
    }

    /// Set listing load attempts
    pub fn listing_retries(mut self, retries: u32) -> Self {
        self.config.listing_retries = retries.max(1);
        self
    }

    /// Set listing page render options
    pub fn listing_render(mut self, opts: RenderOptions) -> Self {
        self.config.listing_render = opts;
        self
    }

    /// Set the linear backoff unit
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    /// Set the alternate listing settle delay
    pub fn alternate_settle(mut self, settle: Duration) -> Self {
        self.config.alternate_settle = settle;
        self
    }

    /// Set the politeness delay
    pub fn politeness_delay(mut self, delay: Duration) -> Self {
        self.config.politeness_delay = delay;
        self
    }

    /// Set the number of article workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers.max(1);
        self
    }

    /// Set or clear the batch deadline
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.config.deadline = deadline;
        self
    }

    /// Set the article fetch mode
    pub fn article_mode(mut self, mode: FetchMode) -> Self {
        self.config.article_mode = mode;
        self
    }

    /// Persist successful articles under `dir`
    pub fn save_to<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.save_dir = Some(dir.into());
        self
    }

    /// Build the config
    pub fn build(self) -> BulkConfig {
        self.config
    }
}

/// A bulk extraction target: where its listing lives and how to read it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Display name
    pub name: String,
    /// Host that article links must belong to
    pub domain: String,
    /// Primary listing page
    pub listing_url: String,
    /// Listing pages tried when the primary fails or yields nothing
    #[serde(default)]
    pub alternate_urls: Vec<String>,
    /// Link selectors, most site-specific first
    pub link_selectors: Vec<String>,
    /// Substrings that exclude a link (case-insensitive)
    #[serde(default = "default_excluded_patterns")]
    pub excluded_patterns: Vec<String>,
    /// Link text must be longer than this many characters
    #[serde(default = "default_min_title_chars")]
    pub min_title_chars: usize,
}

fn default_excluded_patterns() -> Vec<String> {
    vec!["video".into(), "podcast".into(), "photo".into()]
}

fn default_min_title_chars() -> usize {
    20
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::yahoo_finance()
    }
}

impl SiteProfile {
    /// Yahoo Finance latest-news listing
    pub fn yahoo_finance() -> Self {
        Self {
            name: "Yahoo Finance".to_string(),
            domain: "finance.yahoo.com".to_string(),
            listing_url: "https://finance.yahoo.com/topic/latest-news/".to_string(),
            alternate_urls: vec![
                "https://finance.yahoo.com/news/".to_string(),
                "https://finance.yahoo.com/".to_string(),
                "https://finance.yahoo.com/quote/AAPL/news".to_string(),
            ],
            link_selectors: vec![
                "div[data-test='content-list'] a[href*='/news/']".to_string(),
                "ul.js-stream-content li a".to_string(),
                "div.js-stream-content a".to_string(),
                "div[class*='article'] a".to_string(),
                "div[class*='story'] a".to_string(),
            ],
            excluded_patterns: default_excluded_patterns(),
            min_title_chars: default_min_title_chars(),
        }
    }

    /// Load a profile from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
