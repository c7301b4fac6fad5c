//! Flat-file output
//!
//! Extracted articles are handed to the downstream converter as plain text
//! files in a fixed layout. [`format`] renders and parses that layout;
//! [`store`] names and writes the files.

pub mod format;
pub mod store;

pub use format::{parse_article, render_article, ParsedArticle, RULE_WIDTH};
pub use store::{sanitize_filename, ArticleStore, FileNaming, MAX_FILENAME_CHARS};
