//! Article link discovery on listing pages

use super::{element_text, normalize_whitespace};
use crate::config::SiteProfile;
use crate::error::Result;
use crate::model::NewsLink;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use url::Url;

/// Selector used when no site-specific selector matches anything
const GENERIC_LINK_SELECTOR: &str = "a";

/// Finds candidate article links on a listing page
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    selectors: Vec<String>,
    domain: String,
    excluded_patterns: Vec<String>,
    min_title_chars: usize,
}

impl LinkDiscoverer {
    /// Discoverer for a site profile
    pub fn from_profile(profile: &SiteProfile) -> Self {
        Self {
            selectors: profile.link_selectors.clone(),
            domain: profile.domain.to_lowercase(),
            excluded_patterns: profile
                .excluded_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            min_title_chars: profile.min_title_chars,
        }
    }

    /// Discover up to `max_links` article links in `html`.
    ///
    /// Selectors are tried in order and the first one that matches any
    /// element wins; if none do, every anchor is considered. Links are
    /// resolved against `page_url`, must belong to the profile's domain,
    /// must not contain an excluded pattern, and need link text longer than
    /// the configured minimum. Duplicates (same URL ignoring fragment and
    /// trailing slash) are kept once, at their first position.
    #[instrument(skip(self, html), fields(bytes = html.len()))]
    pub fn discover(&self, html: &str, page_url: &str, max_links: usize) -> Result<Vec<NewsLink>> {
        if max_links == 0 {
            return Ok(Vec::new());
        }

        let base = Url::parse(page_url).ok();
        let document = Html::parse_document(html);
        let anchors = self.select_candidates(&document);

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in anchors {
            let Some(href) = anchor.value().attr("href").map(str::trim) else {
                continue;
            };
            if href.is_empty() {
                continue;
            }

            let Some(resolved) = resolve(base.as_ref(), href) else {
                continue;
            };
            if !self.is_on_domain(&resolved) || self.is_excluded(resolved.as_str()) {
                continue;
            }

            let title = normalize_whitespace(&element_text(&anchor));
            if title.chars().count() <= self.min_title_chars {
                continue;
            }

            if !seen.insert(normalize_url(&resolved)) {
                continue;
            }

            links.push(NewsLink {
                url: resolved.to_string(),
                title,
            });
            if links.len() >= max_links {
                break;
            }
        }

        debug!("Discovered {} article links on {}", links.len(), page_url);
        Ok(links)
    }

    /// Elements from the first selector that matches anything
    fn select_candidates<'a>(&self, document: &'a Html) -> Vec<scraper::ElementRef<'a>> {
        let cascade = self
            .selectors
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(GENERIC_LINK_SELECTOR));

        for css in cascade {
            let sel = match Selector::parse(css) {
                Ok(sel) => sel,
                Err(e) => {
                    warn!("Skipping invalid link selector '{}': {}", css, e);
                    continue;
                }
            };

            let matched: Vec<_> = document.select(&sel).collect();
            if !matched.is_empty() {
                debug!("Link selector '{}' matched {} elements", css, matched.len());
                return matched;
            }
        }

        Vec::new()
    }

    fn is_on_domain(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                host == self.domain || host.ends_with(&format!(".{}", self.domain))
            }
            None => false,
        }
    }

    fn is_excluded(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.excluded_patterns.iter().any(|p| lower.contains(p.as_str()))
    }
}

fn resolve(base: Option<&Url>, href: &str) -> Option<Url> {
    let url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Dedup key for a link: no fragment, no trailing slash on the path
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    url.to_string()
}
