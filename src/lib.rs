//! Dragnet: a concurrent web-resource discovery and retrieval engine
//!
//! This crate implements four tools over one architecture: a domain-scoped
//! link/media crawler, a multi-platform username existence prober, a
//! pagination boundary scanner, and an authenticated feed downloader.

pub mod classify;
pub mod config;
pub mod crawl;
pub mod download;
pub mod extract;
pub mod feed;
pub mod fetch;
pub mod pages;
pub mod probe;
pub mod report;
pub mod url;

use thiserror::Error;

/// Main error type for Dragnet operations
#[derive(Debug, Error)]
pub enum DragnetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Extraction error for {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Failed to write {path}: {source}")]
    Persistence {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Dragnet operations
pub type Result<T> = std::result::Result<T, DragnetError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawl::{CollectOptions, Collector, ResourceRecord};
pub use download::{DownloadOutcome, DownloadStatus, Downloader};
pub use fetch::{CancelFlag, ClientConfig, FetchOutcome, Fetcher, RetryPolicy};
pub use probe::ExistenceRecord;
pub use url::{extract_host, normalize_url};
