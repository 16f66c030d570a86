//! HTTP client construction
//!
//! Builds reqwest clients with rotated desktop User-Agents and fetches
//! pages with a bounded retry loop.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// HTTP configuration for crawlers
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
        }
    }
}

/// Errors from crawling
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Page structure not recognized: {0}")]
    Parse(String),
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create an HTTP client for crawling
pub fn create_client(config: &HttpConfig) -> Result<Client, CrawlError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(random_user_agent())
        .build()
        .map_err(|e| CrawlError::ClientBuild(e.to_string()))
}

/// Fetch a page as text, retrying transient failures
pub async fn fetch_page(client: &Client, url: &str, config: &HttpConfig) -> Result<String, CrawlError> {
    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            debug!("Retry {attempt} for {url}");
            tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
        }

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    warn!("Fetch of {url} returned status {status}");
                    return Err(CrawlError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                let body = response.text().await?;
                debug!("Fetched {url} ({} bytes)", body.len());
                return Ok(body);
            }
            Err(e) => {
                warn!("Fetch of {url} failed: {e}");
                last_err = Some(CrawlError::Request(e));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| CrawlError::ClientBuild("no fetch attempts made".to_string())))
}
