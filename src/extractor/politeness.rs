//! Per-domain politeness
//!
//! A [`DomainLimiter`] lets at most one fetch run against a site at a time
//! and spaces consecutive fetches to that site by a fixed delay. Hosts under
//! a registered site domain share that site's slot. The sequential bulk run
//! only needs the delay; worker pools need both.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::debug;
use url::Url;

/// Exclusive right to fetch from one site or host
#[derive(Debug)]
pub struct DomainPermit {
    host: String,
    _permit: OwnedSemaphorePermit,
}

impl DomainPermit {
    /// Site domain or host this permit covers
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// One fetch in flight per site, with a pause between fetches
#[derive(Debug)]
pub struct DomainLimiter {
    delay: Duration,
    sites: Vec<String>,
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl DomainLimiter {
    /// Limiter that pauses `delay` after each fetch
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sites: Vec::new(),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Treat `domain` and all of its subdomains as one site
    pub fn with_site<S: AsRef<str>>(mut self, domain: S) -> Self {
        self.sites.push(domain.as_ref().trim_matches('.').to_lowercase());
        self
    }

    /// Wait for the site of `url` to be free
    pub async fn acquire(&self, url: &str) -> Result<DomainPermit> {
        let host = self.key(url);
        let semaphore = {
            let mut hosts = self.hosts.lock().await;
            hosts
                .entry(host.clone())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        let permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| Error::generic(format!("domain limiter closed: {}", e)))?;
        debug!("Acquired politeness slot for {}", host);

        Ok(DomainPermit {
            host,
            _permit: permit,
        })
    }

    /// Sleep for the politeness delay
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Registered site covering the host of `url`, else the host itself
    fn key(&self, url: &str) -> String {
        let host = host_key(url);
        self.sites
            .iter()
            .find(|site| host == **site || host.ends_with(&format!(".{}", site)))
            .cloned()
            .unwrap_or(host)
    }
}

/// Lowercased host of `url`, or the raw string when it has none
fn host_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| url.to_string())
}
