//! The flat-file article record
//!
//! Layout, byte for byte:
//!
//! ```text
//! 제목: <title>
//! ================================================================================
//!
//! 메타 정보:
//! <key>: <value>
//! --------------------------------------------------------------------------------
//!
//! 본문:
//! <paragraph 1>
//!
//! <paragraph 2>
//! ```
//!
//! The metadata block is present only when the result has metadata. Rule
//! width and section order are part of the format; the downstream
//! converter matches them with fixed patterns.

use crate::error::{Error, Result};
use crate::model::{ExtractionResult, Metadata};
use regex::Regex;

/// Width of the `=` and `-` rules
pub const RULE_WIDTH: usize = 80;

const TITLE_LABEL: &str = "제목: ";
const META_LABEL: &str = "메타 정보:";
const BODY_LABEL: &str = "본문:";

/// Render a result as a flat-file record
pub fn render_article(result: &ExtractionResult) -> String {
    let mut out = String::with_capacity(result.text().len() + 512);

    out.push_str(TITLE_LABEL);
    out.push_str(result.title());
    out.push('\n');
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push_str("\n\n");

    if !result.metadata().is_empty() {
        out.push_str(META_LABEL);
        out.push('\n');
        for (key, value) in result.metadata() {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push_str("\n\n");
    }

    out.push_str(BODY_LABEL);
    out.push('\n');
    out.push_str(result.text());
    out
}

/// Fields recovered from a flat-file record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArticle {
    /// Title line
    pub title: String,
    /// Metadata block, empty when absent
    pub metadata: Metadata,
    /// Everything after the body label, trimmed
    pub body: String,
}

/// Parse a record the way the downstream converter does: title up to the
/// `=` rule, `key: value` lines up to the `-` rule, body to end of text.
pub fn parse_article(record: &str) -> Result<ParsedArticle> {
    let title_re = pattern(r"제목: (.*?)\n={2,}")?;
    let meta_re = pattern(r"(?s)메타 정보:\n(.*?)\n-{2,}")?;

    let body_marker = format!("\n{}\n", BODY_LABEL);
    let body_at = record
        .find(&body_marker)
        .ok_or_else(|| Error::Format("missing body section".to_string()))?;
    let (header, rest) = record.split_at(body_at);
    let body = rest[body_marker.len()..].trim().to_string();

    let title = title_re
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::Format("missing title line".to_string()))?;

    let mut metadata = Metadata::new();
    if let Some(block) = meta_re.captures(header).and_then(|caps| caps.get(1)) {
        for line in block.as_str().lines() {
            if let Some((key, value)) = line.split_once(": ") {
                metadata.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    Ok(ParsedArticle {
        title,
        metadata,
        body,
    })
}

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| Error::Format(format!("bad pattern {}: {}", re, e)))
}
