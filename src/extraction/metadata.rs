//! Page metadata extraction
//!
//! Reads recognized `<meta>` tags, the byline and the publication date.
//! Nothing here fails on a missing value; absent fields come back empty.

use super::{class_contains, element_text, normalize_whitespace, selector};
use crate::error::Result;
use crate::model::Metadata;
use scraper::Html;

/// `<meta>` keys kept in [`Metadata`]
pub const RECOGNIZED_META_KEYS: [&str; 4] = ["description", "author", "published_time", "keywords"];

/// Meta keys consulted for the publication date, in priority order
const DATE_META_KEYS: [&str; 3] = ["date", "article:published_time", "published_time"];

/// Metadata reader over a parsed page
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Recognized meta tags in document order.
    ///
    /// The key is the tag's `name` attribute, or `property` when `name` is
    /// missing, lowercased. Tags with empty content are skipped.
    pub fn extract(document: &Html) -> Result<Metadata> {
        let mut metadata = Metadata::new();

        for (key, content) in Self::meta_pairs(document)? {
            if RECOGNIZED_META_KEYS.contains(&key.as_str()) {
                metadata.insert(key, content);
            }
        }

        Ok(metadata)
    }

    /// Byline from `<meta name="author">`, else the first element whose
    /// class mentions "author"
    pub fn author(document: &Html) -> Result<String> {
        if let Some(author) = Self::meta_value(document, &["author"])? {
            return Ok(author);
        }

        let any = selector("[class]")?;
        Ok(document
            .select(&any)
            .find(|el| class_contains(el, "author"))
            .map(|el| normalize_whitespace(&element_text(&el)))
            .unwrap_or_default())
    }

    /// Publication date from a date meta tag, else the first element whose
    /// class mentions "date" or "time"
    pub fn publish_date(document: &Html) -> Result<String> {
        if let Some(date) = Self::meta_value(document, &DATE_META_KEYS)? {
            return Ok(date);
        }

        let any = selector("[class]")?;
        Ok(document
            .select(&any)
            .find(|el| class_contains(el, "date") || class_contains(el, "time"))
            .map(|el| normalize_whitespace(&element_text(&el)))
            .unwrap_or_default())
    }

    /// First non-empty meta value among `keys`, honoring key priority
    fn meta_value(document: &Html, keys: &[&str]) -> Result<Option<String>> {
        let pairs = Self::meta_pairs(document)?;
        Ok(keys.iter().find_map(|wanted| {
            pairs
                .iter()
                .find(|(key, _)| key == wanted)
                .map(|(_, content)| content.clone())
        }))
    }

    /// `(key, content)` for every meta tag with a key and non-empty content
    fn meta_pairs(document: &Html) -> Result<Vec<(String, String)>> {
        let meta = selector("meta")?;
        Ok(document
            .select(&meta)
            .filter_map(|el| {
                let attrs = el.value();
                let key = attrs.attr("name").or_else(|| attrs.attr("property"))?;
                let content = normalize_whitespace(attrs.attr("content")?);
                if content.is_empty() {
                    return None;
                }
                Some((key.trim().to_lowercase(), content))
            })
            .collect())
    }
}
