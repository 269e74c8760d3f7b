use crate::fetch::ClientConfig;
use crate::feed::Credentials;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
///
/// Every section has working defaults; a config file only overrides what
/// it names. Credentials have no default; feed access requires them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub crawl: CrawlSection,
    #[serde(default)]
    pub probe: ProbeSection,
    #[serde(default)]
    pub pages: PagesSection,
    #[serde(default)]
    pub download: DownloadSection,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// HTTP client settings shared by every operation
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    /// User-Agent header for all requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl ClientSection {
    /// Builds the immutable client configuration passed to fetchers
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout),
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

/// Crawl behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSection {
    /// Worker-pool size for concurrent page fetches
    #[serde(default = "default_crawl_workers")]
    pub workers: usize,

    /// Advisory jittered pause before each fetch (milliseconds)
    #[serde(rename = "politeness-delay-ms", default)]
    pub politeness_delay_ms: u64,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            workers: default_crawl_workers(),
            politeness_delay_ms: 0,
        }
    }
}

/// Prober behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSection {
    /// Worker-pool size (platforms probed concurrently)
    #[serde(default = "default_probe_workers")]
    pub workers: usize,

    /// Pause after a 429 before the response is reported (milliseconds)
    #[serde(rename = "rate-limit-pause-ms", default = "default_rate_limit_pause")]
    pub rate_limit_pause_ms: u64,

    /// Pause between identifiers in wordlist mode (milliseconds)
    #[serde(rename = "wordlist-delay-ms", default = "default_wordlist_delay")]
    pub wordlist_delay_ms: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            workers: default_probe_workers(),
            rate_limit_pause_ms: default_rate_limit_pause(),
            wordlist_delay_ms: default_wordlist_delay(),
        }
    }
}

/// Boundary-scan behavior
#[derive(Debug, Clone, Deserialize)]
pub struct PagesSection {
    /// Delay between binary-search probes (milliseconds)
    #[serde(rename = "probe-delay-ms", default = "default_probe_delay")]
    pub probe_delay_ms: u64,

    /// Delay between linear-scan probes (milliseconds)
    #[serde(rename = "linear-delay-ms", default = "default_linear_delay")]
    pub linear_delay_ms: u64,

    /// Skip-ahead step for the linear scan
    #[serde(default = "default_step")]
    pub step: u64,

    /// Wall-clock bound for the linear scan (seconds)
    #[serde(rename = "scan-timeout", default = "default_scan_timeout")]
    pub scan_timeout: u64,

    /// Highest index the binary search considers
    #[serde(rename = "upper-bound", default = "default_upper_bound")]
    pub upper_bound: u64,

    /// Worker-pool size for scrape mode
    #[serde(rename = "scrape-workers", default = "default_scrape_workers")]
    pub scrape_workers: usize,
}

impl Default for PagesSection {
    fn default() -> Self {
        Self {
            probe_delay_ms: default_probe_delay(),
            linear_delay_ms: default_linear_delay(),
            step: default_step(),
            scan_timeout: default_scan_timeout(),
            upper_bound: default_upper_bound(),
            scrape_workers: default_scrape_workers(),
        }
    }
}

/// Downloader behavior
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSection {
    /// Worker-pool size for concurrent downloads
    #[serde(default = "default_download_workers")]
    pub workers: usize,

    /// Attempts per item on the retrying (feed) path
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            workers: default_download_workers(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_user_agent() -> String {
    ClientConfig::default().user_agent
}

fn default_request_timeout() -> u64 {
    15
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_crawl_workers() -> usize {
    4
}

fn default_probe_workers() -> usize {
    10
}

fn default_rate_limit_pause() -> u64 {
    2000
}

fn default_wordlist_delay() -> u64 {
    1000
}

fn default_probe_delay() -> u64 {
    100
}

fn default_linear_delay() -> u64 {
    200
}

fn default_step() -> u64 {
    10
}

fn default_scan_timeout() -> u64 {
    30
}

fn default_upper_bound() -> u64 {
    1000
}

fn default_scrape_workers() -> usize {
    3
}

fn default_download_workers() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    3
}
