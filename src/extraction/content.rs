//! Article content location
//!
//! Finds the article root with an ordered cascade of structural matchers,
//! then reads the title and the body paragraphs from it. Metadata, author
//! and date come from [`MetadataExtractor`].

use super::{class_contains, element_text, normalize_whitespace, selector, MetadataExtractor};
use crate::error::{ExtractionError, Result};
use crate::model::ArticleFields;
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

/// Title used when a page has neither `<h1>` nor `<title>`
pub const NO_TITLE: &str = "No Title";

/// One step of the article root cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootMatcher {
    /// First element with this tag name
    Tag(String),
    /// First element carrying this class name
    ClassEquals(String),
    /// First element whose class attribute contains this text, ignoring case
    ClassContains(String),
}

impl RootMatcher {
    fn find<'a>(&self, document: &'a Html) -> Result<Option<ElementRef<'a>>> {
        let found = match self {
            RootMatcher::Tag(tag) => document.select(&selector(tag)?).next(),
            RootMatcher::ClassEquals(name) => document
                .select(&selector("[class]")?)
                .find(|el| el.value().classes().any(|c| c == name)),
            RootMatcher::ClassContains(needle) => {
                let needle = needle.to_lowercase();
                document
                    .select(&selector("[class]")?)
                    .find(|el| class_contains(el, &needle))
            }
        };
        Ok(found)
    }
}

/// Locates article fields in a parsed page
#[derive(Debug, Clone)]
pub struct ContentLocator {
    root_cascade: Vec<RootMatcher>,
    body_selector: String,
    boilerplate_prefixes: Vec<String>,
}

impl Default for ContentLocator {
    fn default() -> Self {
        Self {
            root_cascade: vec![
                RootMatcher::Tag("article".to_string()),
                RootMatcher::ClassEquals("article".to_string()),
                RootMatcher::ClassEquals("articlePage".to_string()),
                RootMatcher::ClassContains("article".to_string()),
            ],
            body_selector: "p, h2, h3, blockquote".to_string(),
            boilerplate_prefixes: vec!["Recommended".to_string(), "Related".to_string()],
        }
    }
}

impl ContentLocator {
    /// Locator with the standard cascade
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the root cascade
    pub fn with_root_cascade(mut self, cascade: Vec<RootMatcher>) -> Self {
        self.root_cascade = cascade;
        self
    }

    /// Add a paragraph prefix to drop as boilerplate
    pub fn with_boilerplate_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.boilerplate_prefixes.push(prefix.into());
        self
    }

    /// Locate every article field in `html`.
    ///
    /// Fails with [`ExtractionError::NoArticleFound`] when no cascade step
    /// matches and [`ExtractionError::EmptyContent`] when the root has no
    /// usable paragraphs. Title, metadata, author and date never fail.
    #[instrument(skip_all, fields(bytes = html.len()))]
    pub fn locate(&self, html: &str) -> Result<ArticleFields> {
        let document = Html::parse_document(html);

        let root = self
            .find_root(&document)?
            .ok_or(ExtractionError::NoArticleFound)?;

        let paragraphs = self.paragraphs(root)?;
        if paragraphs.is_empty() {
            return Err(ExtractionError::EmptyContent.into());
        }

        let fields = ArticleFields {
            title: Self::title(&document)?,
            metadata: MetadataExtractor::extract(&document)?,
            author: MetadataExtractor::author(&document)?,
            publish_date: MetadataExtractor::publish_date(&document)?,
            paragraphs,
        };

        debug!(
            "Located article: {} paragraphs, {} metadata keys",
            fields.paragraphs.len(),
            fields.metadata.len()
        );
        Ok(fields)
    }

    /// First element matched by the cascade, in cascade priority order
    pub fn find_root<'a>(&self, document: &'a Html) -> Result<Option<ElementRef<'a>>> {
        for (step, matcher) in self.root_cascade.iter().enumerate() {
            if let Some(root) = matcher.find(document)? {
                debug!("Article root matched by step {} ({:?})", step, matcher);
                return Ok(Some(root));
            }
        }
        Ok(None)
    }

    /// Page title: first `<h1>`, else `<title>`, else [`NO_TITLE`]
    pub fn title(document: &Html) -> Result<String> {
        for css in ["h1", "title"] {
            if let Some(el) = document.select(&selector(css)?).next() {
                let text = normalize_whitespace(&element_text(&el));
                if !text.is_empty() {
                    return Ok(text);
                }
            }
        }
        Ok(NO_TITLE.to_string())
    }

    /// Body paragraphs under `root`, in document order, minus boilerplate
    pub fn paragraphs(&self, root: ElementRef<'_>) -> Result<Vec<String>> {
        let body = selector(&self.body_selector)?;
        Ok(root
            .select(&body)
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .filter(|text| !self.is_boilerplate(text))
            .collect())
    }

    fn is_boilerplate(&self, text: &str) -> bool {
        self.boilerplate_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
    }
}
