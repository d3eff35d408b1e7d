//! Plain HTTP fetcher for the listings page.
//!
//! A single unauthenticated GET with a realistic browser identity and a
//! bounded timeout. Failures are recoverable: the caller falls through to
//! the later extraction tiers instead of aborting the run.

mod user_agent;

pub use user_agent::{resolve_user_agent, STATIC_FETCH_USER_AGENT, USER_AGENT};

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Static fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    HttpStatus(StatusCode),
}

/// HTTP client for static page fetches.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given timeout.
    pub fn new(timeout: Duration) -> Self {
        Self::with_user_agent(timeout, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    /// - None: use the browser-like static fetch user agent
    /// - Some(custom): use a custom user agent string
    pub fn with_user_agent(timeout: Duration, user_agent_config: Option<&str>) -> Self {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch a page as text.
    ///
    /// Returns `FetchError::HttpStatus` for any non-2xx response and
    /// `FetchError::Network` for transport failures.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        Ok(response.text().await?)
    }

    /// Fetch a small text resource (version endpoints and similar).
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }
        Ok(response.text().await?)
    }

    /// Access the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
