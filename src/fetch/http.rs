//! Static fetching over plain HTTP

use super::{user_agent, validate_url, FetchMode, Fetcher};
use crate::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, instrument};

/// Single-GET fetcher with a bounded timeout and a rotating user agent
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_millis() as u64)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn mode(&self) -> FetchMode {
        FetchMode::Static
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent::random())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
