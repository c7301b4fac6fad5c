//! Content extraction module
//!
//! Pure DOM heuristics over parsed HTML, no I/O: locating the article and
//! its body, reading page metadata, and discovering article links on a
//! listing page.

pub mod content;
pub mod links;
pub mod metadata;

pub use content::{ContentLocator, RootMatcher};
pub use links::{normalize_url, LinkDiscoverer};
pub use metadata::MetadataExtractor;

use crate::error::{ExtractionError, Result};
use scraper::{ElementRef, Selector};

/// Parse a CSS selector, reporting failures as extraction errors
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector(format!("{}: {}", css, e)).into())
}

/// Collapse all whitespace runs to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of an element, trimmed
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Whether the element's class attribute contains `needle` (case-insensitive)
pub(crate) fn class_contains(el: &ElementRef<'_>, needle: &str) -> bool {
    el.value()
        .attr("class")
        .map(|class| class.to_lowercase().contains(needle))
        .unwrap_or(false)
}
