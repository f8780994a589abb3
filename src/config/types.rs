use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Slang-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub lookup: LookupConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl trail configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Random-word URL every trail starts from
    #[serde(rename = "entry-url")]
    pub entry_url: String,

    /// Total number of pages the whole run aims to visit
    #[serde(rename = "pages-to-visit")]
    pub pages_to_visit: u32,

    /// Maximum number of pages a single trail visits
    #[serde(rename = "cluster-size")]
    pub cluster_size: u32,

    /// Number of trails running in parallel
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Pause between two pages of the same trail (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: f64,

    /// Per-request timeout for page fetches and lookups (seconds)
    #[serde(rename = "request-timeout-seconds", default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl CrawlerConfig {
    /// Number of trails needed to cover `pages_to_visit` pages
    pub fn trail_count(&self) -> usize {
        let pages = self.pages_to_visit as usize;
        let cluster = self.cluster_size.max(1) as usize;
        pages.div_ceil(cluster)
    }

    /// Delay between hops as a `Duration`
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_seconds)
    }

    /// Per-request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Lexical authority lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Search endpoint queried once per token
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Browser-like User-Agent sent with every lookup
    #[serde(rename = "user-agent", default = "default_browser_agent")]
    pub user_agent: String,
}

/// User agent identification for page fetches
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the CSV store
    pub directory: String,

    /// File name of the CSV store
    #[serde(rename = "file-name")]
    pub file_name: String,
}

impl OutputConfig {
    /// Full path of the CSV store
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.file_name)
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_browser_agent() -> String {
    "Mozilla/5.0".to_string()
}
