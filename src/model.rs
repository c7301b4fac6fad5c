//! Data model for extraction results
//!
//! - [`ExtractionResult`]: the canonical record for one extracted URL
//! - [`ArticleFields`]: what the content locator finds on a page
//! - [`NewsLink`]: a candidate article discovered on a listing page
//! - [`BulkReport`]: ordered results and outcome of one bulk run

use crate::error::{Error, ExtractionError};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Ordered `<meta>` values keyed by recognized name
pub type Metadata = IndexMap<String, String>;

/// Article body, paragraph by paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    /// Paragraphs joined by a blank line
    pub text: String,
    /// Paragraphs in document order
    pub paragraphs: Vec<String>,
}

impl ArticleContent {
    /// Build content from paragraphs, joining them with a blank line
    pub fn from_paragraphs(paragraphs: Vec<String>) -> Self {
        Self {
            text: paragraphs.join("\n\n"),
            paragraphs,
        }
    }
}

/// Fields located on an article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    /// Headline, or `"No Title"` when the page has none
    pub title: String,
    /// Recognized meta tags in document order
    pub metadata: Metadata,
    /// Byline, empty if not found
    pub author: String,
    /// Publication date as printed on the page, empty if not found
    pub publish_date: String,
    /// Body paragraphs in document order
    pub paragraphs: Vec<String>,
}

/// The canonical output of extracting one URL.
///
/// A result is either a success carrying non-empty content and no error, or
/// a failure carrying an error message and no content. Fields are private so
/// the two shapes can only be built through [`ExtractionResult::from_fields`]
/// and [`ExtractionResult::failure`]; a result never changes after it is
/// returned.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    url: String,
    success: bool,
    timestamp: DateTime<Utc>,
    title: String,
    metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<ArticleContent>,
    author: String,
    publish_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ExtractionResult {
    /// Build a successful result from located fields.
    ///
    /// Falls back to a failure if `fields` carries no paragraphs, so a
    /// success always has content.
    pub fn from_fields(url: impl Into<String>, fields: ArticleFields) -> Self {
        if fields.paragraphs.is_empty() {
            return Self::failure(url, Error::from(ExtractionError::EmptyContent).result_message());
        }

        Self {
            url: url.into(),
            success: true,
            timestamp: Utc::now(),
            title: fields.title,
            metadata: fields.metadata,
            content: Some(ArticleContent::from_paragraphs(fields.paragraphs)),
            author: fields.author,
            publish_date: fields.publish_date,
            error: None,
        }
    }

    /// Build a failed result
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "unknown error".to_string();
        }

        Self {
            url: url.into(),
            success: false,
            timestamp: Utc::now(),
            title: String::new(),
            metadata: Metadata::new(),
            content: None,
            author: String::new(),
            publish_date: String::new(),
            error: Some(error),
        }
    }

    /// Source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether extraction produced usable content
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Completion time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Title, empty on failure
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Recognized metadata in document order
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Body content, `None` on failure
    pub fn content(&self) -> Option<&ArticleContent> {
        self.content.as_ref()
    }

    /// Body text, empty on failure
    pub fn text(&self) -> &str {
        self.content.as_ref().map(|c| c.text.as_str()).unwrap_or("")
    }

    /// Author, empty if not found
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Publish date, empty if not found
    pub fn publish_date(&self) -> &str {
        &self.publish_date
    }

    /// Error message, `None` on success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// A candidate article found on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsLink {
    /// Absolute article URL
    pub url: String,
    /// Link text
    pub title: String,
}

/// How a bulk run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    /// Every discovered link was attempted
    Completed,
    /// No listing page could be loaded; results are empty
    ListingLoadFailed,
    /// The batch deadline expired; results are partial
    DeadlineExceeded,
    /// A stage panicked; results are partial
    Panicked,
}

impl fmt::Display for BulkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BulkOutcome::Completed => "completed",
            BulkOutcome::ListingLoadFailed => "listing load failed",
            BulkOutcome::DeadlineExceeded => "deadline exceeded",
            BulkOutcome::Panicked => "panicked",
        };
        f.write_str(s)
    }
}

/// Results of one bulk run, in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    /// One result per attempted link, in discovery order
    pub results: Vec<ExtractionResult>,
    /// Terminal state of the run
    pub outcome: BulkOutcome,
    /// Listing URL the links were discovered on, if any loaded
    pub listing_url: Option<String>,
    /// Files written for successful articles
    pub saved_files: Vec<PathBuf>,
}

impl BulkReport {
    /// Number of successful extractions
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed extractions
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Consume the report, keeping only the results
    pub fn into_results(self) -> Vec<ExtractionResult> {
        self.results
    }
}

impl fmt::Display for BulkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "succeeded {}/{} articles, {} failed ({})",
            self.success_count(),
            self.results.len(),
            self.failure_count(),
            self.outcome
        )
    }
}
