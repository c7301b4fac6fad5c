//! Persisting article records to disk

use super::render_article;
use crate::error::{Error, Result};
use crate::model::ExtractionResult;
use chrono::Local;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Longest sanitized title kept in a file name, in characters
pub const MAX_FILENAME_CHARS: usize = 100;

/// Characters never allowed in a file name
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Give up looking for a free name after this many suffixes
const MAX_COLLISION_SUFFIX: u32 = 1000;

/// How a saved record is named
#[derive(Debug, Clone, Copy)]
pub enum FileNaming<'a> {
    /// `article_<YYYYmmdd_HHMMSS>.txt`
    Timestamped,
    /// `<sanitized title>_<YYYYmmdd_HHMMSS>.txt`
    Titled(&'a str),
}

/// Make `title` safe to use as a file name stem.
///
/// Forbidden characters and whitespace become `_`, runs of `_` collapse to
/// one, and the result is cut to [`MAX_FILENAME_CHARS`] characters.
pub fn sanitize_filename(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        let c = if FORBIDDEN_CHARS.contains(&c) || c.is_whitespace() || c.is_control() {
            '_'
        } else {
            c
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.chars().take(MAX_FILENAME_CHARS).collect()
}

/// Writes successful results under one directory
#[derive(Debug, Clone)]
pub struct ArticleStore {
    dir: PathBuf,
}

impl ArticleStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `result` as a flat-file record and return its path.
    ///
    /// Existing files are never overwritten; a `_1`, `_2`, ... suffix is
    /// added when the name is taken.
    #[instrument(skip(self, result), fields(url = result.url()))]
    pub async fn save(&self, result: &ExtractionResult, naming: FileNaming<'_>) -> Result<PathBuf> {
        if !result.is_success() {
            return Err(Error::generic("refusing to persist a failed extraction"));
        }

        fs::create_dir_all(&self.dir).await?;

        let timestamp = result
            .timestamp()
            .with_timezone(&Local)
            .format("%Y%m%d_%H%M%S")
            .to_string();
        let stem = match naming {
            FileNaming::Timestamped => format!("article_{}", timestamp),
            FileNaming::Titled(title) => {
                let name = sanitize_filename(title);
                let name = if name.is_empty() { "article".to_string() } else { name };
                format!("{}_{}", name, timestamp)
            }
        };

        let record = render_article(result);
        let path = self.write_new(&stem, record.as_bytes()).await?;
        info!("Saved article to {}", path.display());
        Ok(path)
    }

    async fn write_new(&self, stem: &str, bytes: &[u8]) -> Result<PathBuf> {
        for suffix in 0..MAX_COLLISION_SUFFIX {
            let name = if suffix == 0 {
                format!("{}.txt", stem)
            } else {
                format!("{}_{}.txt", stem, suffix)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next suffix", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::generic(format!(
            "no free file name for {} in {}",
            stem,
            self.dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArticleFields;
    use proptest::prelude::*;

    fn success() -> ExtractionResult {
        ExtractionResult::from_fields(
            "https://example.com/a",
            ArticleFields {
                title: "Title".to_string(),
                paragraphs: vec!["Body.".to_string()],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("Dow: up 2% / S&P \"flat\"?"),
            "Dow_up_2%_S&P_flat_"
        );
        assert_eq!(sanitize_filename("a  <>  b"), "a_b");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
    }

    #[tokio::test]
    async fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(dir.path().join("out"));
        let result = success();

        let first = store.save(&result, FileNaming::Timestamped).await.unwrap();
        let second = store.save(&result, FileNaming::Timestamped).await.unwrap();

        assert_ne!(first, second);
        assert!(first.file_name().unwrap().to_string_lossy().starts_with("article_"));
        assert!(second.to_string_lossy().ends_with("_1.txt"));
    }

    #[tokio::test]
    async fn test_titled_naming() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(dir.path());

        let path = store
            .save(&success(), FileNaming::Titled("Fed holds: rates steady"))
            .await
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Fed_holds_rates_steady_"), "{}", name);
        assert!(name.ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_failed_result_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArticleStore::new(dir.path());
        let failed = ExtractionResult::failure("https://example.com/a", "page load timeout");
        assert!(store.save(&failed, FileNaming::Timestamped).await.is_err());
    }

    proptest! {
        #[test]
        fn sanitized_names_are_safe(title in ".*") {
            let name = sanitize_filename(&title);
            prop_assert!(name.chars().count() <= MAX_FILENAME_CHARS);
            prop_assert!(!name.contains("__"));
            prop_assert!(!name.chars().any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_whitespace()));
        }
    }
}
