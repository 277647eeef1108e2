//! Page fetching and the fetch-then-extract pipeline.
//!
//! Network faults never escape this module as errors: they are logged with
//! the URL and error text and reported as [`PriceLookup::Unreachable`].

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extractor::extract;
use crate::models::Price;

/// Desktop Chrome on Windows. Several of the storefronts serve an empty shell
/// to unknown agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page and return its body as text.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches pages with one GET per call, no retries.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-AU,en;q=0.9"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!(url = %url, "Fetching product page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(FetchError::Body)
    }
}

/// Outcome of fetching one product page and extracting its price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceLookup {
    Found(Price),
    NotFound,
    Unreachable,
}

impl PriceLookup {
    pub fn price(self) -> Option<Price> {
        match self {
            PriceLookup::Found(price) => Some(price),
            PriceLookup::NotFound | PriceLookup::Unreachable => None,
        }
    }
}

pub async fn lookup_price<F>(fetcher: &F, url: &str) -> PriceLookup
where
    F: PageFetcher + ?Sized,
{
    let html = match fetcher.fetch_html(url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to fetch product page");
            return PriceLookup::Unreachable;
        }
    };

    match extract(url, &html) {
        Some(price) => PriceLookup::Found(price),
        None => PriceLookup::NotFound,
    }
}

/// Fetch `url` and extract its price; any failure is `None`.
pub async fn fetch_and_extract<F>(fetcher: &F, url: &str) -> Option<Price>
where
    F: PageFetcher + ?Sized,
{
    lookup_price(fetcher, url).await.price()
}
