//! Page fetching
//!
//! Raw HTML comes from one of two strategies behind the [`Fetcher`] trait:
//! a plain HTTP GET ([`HttpFetcher`]) or a headless-browser render
//! ([`BrowserFetcher`]). A [`FetchSession`] owns one of each and is the only
//! thing the extractors hold.

pub mod dynamic;
pub mod http;
pub mod session;
pub mod user_agent;

pub use dynamic::BrowserFetcher;
pub use http::HttpFetcher;
pub use session::FetchSession;

use crate::error::{FetchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Static (plain HTTP) or dynamic (browser-rendered) retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Single HTTP GET
    Static,
    /// Headless browser navigation
    Dynamic,
}

/// Sites whose articles only render with JavaScript
const DYNAMIC_SITE_HINTS: &[&str] = &["yahoo", "finance", "bloomberg", "cnbc", "marketwatch"];

impl FetchMode {
    /// Suggest a mode for `url` from its domain.
    ///
    /// This is a caller-side heuristic; extractors always use the mode
    /// they are given.
    pub fn suggest_for(url: &str) -> Self {
        let lower = url.to_lowercase();
        if DYNAMIC_SITE_HINTS.iter().any(|hint| lower.contains(hint)) {
            FetchMode::Dynamic
        } else {
            FetchMode::Static
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Static => f.write_str("static"),
            FetchMode::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Something that turns a URL into HTML
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Which strategy this fetcher implements
    fn mode(&self) -> FetchMode;

    /// Fetch `url` and return its HTML
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Parse `url`, accepting only http and https
pub fn validate_url(url: &str) -> Result<Url> {
    if url.is_empty() {
        return Err(FetchError::InvalidUrl("URL cannot be empty".to_string()).into());
    }

    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, url
        ))
        .into()),
    }
}
