//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with a proper user agent string
//! - GET requests for listing and detail pages
//! - Classifying responses into pages or failures
//!
//! A [`Session`] owns the client for the whole run. Every call to
//! [`Session::open`] yields an independent [`LoadedPage`] owned by the caller,
//! so detail fetches never disturb the listing page being walked.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::CrawlerError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the client gave up because of a timeout
        timed_out: bool,
    },
}

impl FetchResult {
    /// Turns a fetch outcome into a page, or the error describing the failure
    pub fn into_page(self, requested: &Url) -> Result<LoadedPage, CrawlerError> {
        let url = requested.to_string();
        match self {
            Self::Success {
                final_url, body, ..
            } => Ok(LoadedPage {
                url: final_url,
                body,
            }),
            Self::ContentMismatch { content_type } => {
                Err(CrawlerError::ContentMismatch { url, content_type })
            }
            Self::HttpError { status_code } => Err(CrawlerError::Http {
                url,
                status: status_code,
            }),
            Self::NetworkError {
                timed_out: true, ..
            } => Err(CrawlerError::Timeout { url }),
            Self::NetworkError { error, .. } => Err(CrawlerError::Network {
                url,
                message: error,
            }),
        }
    }
}

/// A fetched HTML page
///
/// Owned by whoever opened it; dropping it releases the page.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// URL the content was served from, after redirects
    pub url: Url,
    /// Raw HTML
    pub body: String,
}

/// The browsing session shared by the pagination driver and the category resolver
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
}

impl Session {
    /// Creates a session around an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a session from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, CrawlerError> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }

    /// Opens `url` in a fresh page context
    pub async fn open(&self, url: &Url) -> Result<LoadedPage, CrawlerError> {
        fetch_url(&self.client, url).await.into_page(url)
    }
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::{CrawlerConfig, UserAgentConfig};
/// use catalog_crawler::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "CatalogCrawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
/// let crawler = CrawlerConfig {
///     base_url: "https://books.toscrape.com/".to_string(),
///     max_concurrent_detail_fetches: 1,
///     request_timeout_secs: 30,
///     connect_timeout_secs: 10,
/// };
///
/// let client = build_http_client(&user_agent, &crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML or no Content-Type | Success |
/// | 2xx with another Content-Type | ContentMismatch |
/// | Any other status | HttpError |
/// | Timeout | NetworkError (timed out) |
/// | Connection/body failure | NetworkError |
///
/// No retries are attempted.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_network_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_network_error(e),
    }
}

fn classify_network_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}

/// Servers that omit the header are given the benefit of the doubt
fn is_html(content_type: &str) -> bool {
    content_type.is_empty() || content_type.to_ascii_lowercase().contains("html")
}
