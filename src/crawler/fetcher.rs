//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent and timeout
//! - One GET per page, following redirects
//! - Folding every failure into [`FetchOutcome::Failed`] so a trail never sees an error

use crate::config::UserAgentConfig;
use crate::crawler::parser::{parse_page, ParsedPage};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and parsed
    Page(ParsedPage),

    /// Network error, timeout, non-success status or unreadable body
    Failed {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// The parsed page, or an empty page without a next link on failure
    pub fn into_page(self) -> ParsedPage {
        match self {
            Self::Page(page) => page,
            Self::Failed { .. } => ParsedPage::default(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Anything that can turn a URL into a parsed dictionary page
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Timeout applied to every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use slang_harvest::config::UserAgentConfig;
/// use slang_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "SlangHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches dictionary pages over HTTP
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        fetch_page(&self.client, url).await
    }
}

/// Fetches and parses one page
///
/// Redirects are followed; a relative next link is resolved against the final
/// URL so that the random entry point's redirect target is the base.
pub async fn fetch_page(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchOutcome::Failed { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::Failed {
            error: format!("HTTP {}", status.as_u16()),
        };
    }

    let final_url = response.url().clone();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return FetchOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    match parse_page(&body, &final_url) {
        Ok(page) => FetchOutcome::Page(page),
        Err(e) => FetchOutcome::Failed {
            error: format!("Parse error: {}", e),
        },
    }
}
