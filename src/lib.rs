//! NewsForge Extractor - News Article Extraction Core
//!
//! Turns news article URLs into clean, structured records, either one URL
//! at a time or in bulk from a site's listing page.
//!
//! # Features
//!
//! - **Two fetch modes**: plain HTTP or a headless Chromium render (CDP)
//! - **Content location**: article root cascade, title, metadata, body paragraphs
//! - **Bulk runs**: listing retries, alternate listings, politeness delays, optional worker pool
//! - **Flat-file output**: the fixed text layout consumed by the downstream converter
//!
//! # Architecture
//!
//! ```text
//! caller ──▶ BulkExtractor ──▶ LinkDiscoverer
//!                 │
//!                 ▼
//!           SingleExtractor ──▶ FetchSession ──▶ HttpFetcher / BrowserFetcher
//!                 │
//!                 ▼
//!           ContentLocator ──▶ ExtractionResult ──▶ ArticleStore (optional)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use newsforge_extractor::config::ExtractorConfig;
//! use newsforge_extractor::extractor::SingleExtractor;
//! use newsforge_extractor::fetch::FetchMode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = "https://www.example.com/news/story.html";
//!     let mode = FetchMode::suggest_for(url);
//!
//!     let extractor = SingleExtractor::new(ExtractorConfig::default(), mode == FetchMode::Dynamic).await?;
//!     let result = extractor.extract(url, mode).await;
//!     extractor.close().await?;
//!
//!     if result.is_success() {
//!         println!("{}: {}", result.title(), result.text());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod error;
pub mod extraction;
pub mod extractor;
pub mod fetch;
pub mod model;
pub mod output;

// Re-exports for convenience
pub use config::{BulkConfig, ExtractorConfig, SiteProfile};
pub use error::{Error, ErrorKind, Result};
pub use extraction::{ContentLocator, LinkDiscoverer, MetadataExtractor};
pub use extractor::{BulkExtractor, SingleExtractor};
pub use fetch::{FetchMode, FetchSession, Fetcher};
pub use model::{BulkOutcome, BulkReport, ExtractionResult, NewsLink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
