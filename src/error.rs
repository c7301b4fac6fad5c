//! Error types for the extractor
//!
//! Errors are layered the same way the pipeline is: fetch, browser,
//! extraction and bulk errors each get their own enum and fold into the
//! crate-level [`Error`]. Every error also classifies into an [`ErrorKind`],
//! which is what callers see once a failure is recorded on an
//! [`ExtractionResult`](crate::model::ExtractionResult).

use thiserror::Error;

/// The main error type for extraction operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Bulk run errors
    #[error("Bulk error: {0}")]
    Bulk(#[from] BulkError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed flat-file article record
    #[error("Article format error: {0}")]
    Format(String),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Static HTTP fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Request exceeded its timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Connection, TLS or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("HTTP error {status}: {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Reason phrase or URL
        message: String,
    },

    /// URL could not be parsed or has an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Browser already closed
    #[error("Browser already closed")]
    AlreadyClosed,

    /// Dynamic fetch requested on a session without a browser
    #[error("No browser in this fetch session")]
    NotAvailable,

    /// Navigation or readiness wait exceeded its timeout
    #[error("Navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    /// Any other fault reported by the browser process
    #[error("{0}")]
    Fault(String),
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No element matched the article root cascade
    #[error("article body not found")]
    NoArticleFound,

    /// Article root had no usable paragraphs
    #[error("article body is empty")]
    EmptyContent,

    /// Invalid selector
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Bulk run errors
#[derive(Error, Debug)]
pub enum BulkError {
    /// Neither the primary listing nor any alternate could be loaded
    #[error("listing page could not be loaded after {attempts} attempts")]
    ListingLoadFailed {
        /// Total navigation attempts made
        attempts: u32,
    },
}

/// Failure taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Static or dynamic fetch timed out
    FetchTimeout,
    /// HTTP status or transport failure
    FetchNetworkError,
    /// Browser process or protocol failure
    BrowserFault,
    /// No article root located
    NoArticleFound,
    /// Article root had no paragraphs
    EmptyContent,
    /// Listing page unavailable
    ListingLoadFailed,
    /// Anything else
    Other,
}

/// Result type alias for extractor operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Classify this error into the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fetch(FetchError::Timeout(_)) => ErrorKind::FetchTimeout,
            Error::Fetch(_) => ErrorKind::FetchNetworkError,
            Error::Browser(BrowserError::NavigationTimeout(_)) => ErrorKind::FetchTimeout,
            Error::Browser(_) | Error::Cdp(_) => ErrorKind::BrowserFault,
            Error::Extraction(ExtractionError::NoArticleFound) => ErrorKind::NoArticleFound,
            Error::Extraction(ExtractionError::EmptyContent) => ErrorKind::EmptyContent,
            Error::Bulk(BulkError::ListingLoadFailed { .. }) => ErrorKind::ListingLoadFailed,
            _ => ErrorKind::Other,
        }
    }

    /// Message recorded on a failed extraction result
    pub fn result_message(&self) -> String {
        match self.kind() {
            ErrorKind::FetchTimeout => "page load timeout".to_string(),
            ErrorKind::BrowserFault => format!("driver error: {}", self.fault_detail()),
            _ => self.to_string(),
        }
    }

    fn fault_detail(&self) -> String {
        match self {
            Error::Browser(e) => e.to_string(),
            Error::Cdp(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}
