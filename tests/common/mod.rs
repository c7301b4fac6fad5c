//! Shared test fixtures
//!
//! In-memory stand-ins for the browser and the HTTP client, plus HTML
//! builders for article and listing pages. Nothing here launches Chrome
//! or touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use newsforge_extractor::browser::{BrowserDriver, RenderOptions};
use newsforge_extractor::config::{BulkConfig, ExtractorConfig, SiteProfile};
use newsforge_extractor::error::{BrowserError, FetchError, Result};
use newsforge_extractor::extractor::{BulkExtractor, SingleExtractor};
use newsforge_extractor::fetch::{FetchMode, FetchSession, Fetcher};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LISTING_URL: &str = "https://finance.yahoo.com/topic/latest-news/";

/// How a scripted URL misbehaves
#[derive(Debug, Clone)]
enum Script {
    Timeout,
    Fault(String),
    Panic,
    Slow(Duration),
    /// Time out this many times, then serve the page
    Flaky(usize),
}

/// Browser double: serves canned pages and counts calls
#[derive(Default)]
pub struct MockDriver {
    pages: HashMap<String, String>,
    scripts: Mutex<HashMap<String, Script>>,
    renders: Mutex<Vec<String>>,
    quits: AtomicUsize,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    fn script(self, url: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), script);
        self
    }

    pub fn timeout_on(self, url: &str) -> Self {
        self.script(url, Script::Timeout)
    }

    pub fn fault_on(self, url: &str, detail: &str) -> Self {
        self.script(url, Script::Fault(detail.to_string()))
    }

    pub fn panic_on(self, url: &str) -> Self {
        self.script(url, Script::Panic)
    }

    pub fn slow_on(self, url: &str, delay: Duration) -> Self {
        self.script(url, Script::Slow(delay))
    }

    pub fn flaky_on(self, url: &str, failures: usize) -> Self {
        self.script(url, Script::Flaky(failures))
    }

    pub fn quit_count(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn render_count(&self, url: &str) -> usize {
        self.renders.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.renders.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn render(&self, url: &str, _opts: &RenderOptions) -> Result<String> {
        self.renders.lock().unwrap().push(url.to_string());

        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(url) {
                Some(Script::Flaky(0)) => None,
                Some(Script::Flaky(left)) => {
                    *left -= 1;
                    Some(Script::Timeout)
                }
                other => other.cloned(),
            }
        };

        match script {
            Some(Script::Timeout) => return Err(BrowserError::NavigationTimeout(20_000).into()),
            Some(Script::Fault(detail)) => return Err(BrowserError::Fault(detail).into()),
            Some(Script::Panic) => panic!("simulated renderer crash on {}", url),
            Some(Script::Slow(delay)) => tokio::time::sleep(delay).await,
            Some(Script::Flaky(_)) | None => {}
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Fault(format!("no page at {}", url)).into())
    }

    async fn quit(&self) -> Result<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// HTTP double serving canned pages; unknown URLs are 404s
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
    timeouts: HashSet<String>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn timeout_on(mut self, url: &str) -> Self {
        self.timeouts.insert(url.to_string());
        self
    }
}

#[async_trait]
impl Fetcher for StaticPages {
    fn mode(&self) -> FetchMode {
        FetchMode::Static
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        if self.timeouts.contains(url) {
            return Err(FetchError::Timeout(30_000).into());
        }
        self.pages.get(url).cloned().ok_or_else(|| {
            FetchError::HttpStatus {
                status: 404,
                message: "Not Found".to_string(),
            }
            .into()
        })
    }
}

pub fn session(http: StaticPages, driver: Option<Arc<MockDriver>>) -> FetchSession {
    FetchSession::from_parts(
        Arc::new(http),
        driver.map(|d| d as Arc<dyn BrowserDriver>),
        Duration::from_secs(20),
    )
}

pub fn single(http: StaticPages, driver: Option<Arc<MockDriver>>, config: ExtractorConfig) -> SingleExtractor {
    SingleExtractor::with_session(session(http, driver), config)
}

/// Bulk config with every delay zeroed
pub fn fast_bulk() -> newsforge_extractor::config::BulkConfigBuilder {
    BulkConfig::builder()
        .retry_backoff(Duration::ZERO)
        .alternate_settle(Duration::ZERO)
        .politeness_delay(Duration::ZERO)
}

pub fn bulk(driver: Arc<MockDriver>, config: BulkConfig) -> BulkExtractor {
    let extractor = single(StaticPages::new(), Some(driver), ExtractorConfig::default());
    BulkExtractor::with_extractor(extractor, config, SiteProfile::yahoo_finance())
}

pub fn article_url(n: usize) -> String {
    format!("https://finance.yahoo.com/news/story-number-{}.html", n)
}

pub fn article_html(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><head><title>{title}</title>
           <meta name="description" content="About {title}">
           <meta name="author" content="Staff Writer">
           </head><body><article><h1>{title}</h1>{body}</article></body></html>"#
    )
}

pub fn listing_html(urls: &[String]) -> String {
    let anchors: String = urls
        .iter()
        .enumerate()
        .map(|(i, url)| format!(r#"<li><a href="{}">Market headline number {} for today</a></li>"#, url, i))
        .collect();
    format!(
        r#"<html><body><ul class="js-stream-content">{}</ul></body></html>"#,
        anchors
    )
}

/// Driver serving a listing with `n` articles, all extractable
pub fn site_with_articles(n: usize) -> MockDriver {
    let urls: Vec<String> = (0..n).map(article_url).collect();
    let mut driver = MockDriver::new().page(LISTING_URL, listing_html(&urls));
    for (i, url) in urls.iter().enumerate() {
        let title = format!("Story {}", i);
        driver = driver.page(url, article_html(&title, &["Lead paragraph.", "Second paragraph."]));
    }
    driver
}
