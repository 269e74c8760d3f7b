//! HTTP fetch layer
//!
//! This module handles all HTTP requests for the engine:
//! - Building clients from an explicit, immutable [`ClientConfig`] (there
//!   is no process-wide session; every component receives its client)
//! - Single bounded-timeout requests returning a [`FetchOutcome`]
//! - Error classification (timeout vs. connect vs. other transport)
//!
//! Retry behavior lives in [`retry`], not here: a `Fetcher` call is always
//! a single attempt.

mod retry;

pub use retry::{classify_status, FailureType, RetryDecision, RetryPolicy};

use rand::Rng;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Immutable HTTP client configuration
///
/// The default user agent imitates a desktop browser, which is as far as
/// the engine goes toward anti-bot measures.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Total per-request timeout
    pub request_timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            request_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Builds an HTTP client from a [`ClientConfig`]
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Result of a single fetch attempt
///
/// Owned transiently by the worker that produced it; classification and
/// extraction consume it without sharing.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server answered (any status code)
    Response {
        /// HTTP status code
        status: u16,
        /// Final URL after redirects
        final_url: String,
        /// Response body as text
        body: String,
        /// Wall-clock time for the request
        elapsed: Duration,
    },

    /// The request never produced a response
    TransportError {
        /// Error description
        message: String,
        /// Whether the failure was a timeout
        timed_out: bool,
        /// Wall-clock time until failure
        elapsed: Duration,
    },
}

impl FetchOutcome {
    /// Returns the status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::TransportError { .. } => None,
        }
    }
}

/// Performs single-attempt HTTP requests with a fixed timeout
///
/// Cheap to clone; the underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher from a client configuration
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already-built client (used by the feed module, which adds
    /// auth headers of its own)
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL and reads the body as text
    ///
    /// Never returns an error: transport failures are data, carried in the
    /// [`FetchOutcome::TransportError`] variant.
    pub async fn fetch_page(&self, url: &Url) -> FetchOutcome {
        let start = Instant::now();

        match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let final_url = response.url().to_string();

                match response.text().await {
                    Ok(body) => FetchOutcome::Response {
                        status,
                        final_url,
                        body,
                        elapsed: start.elapsed(),
                    },
                    Err(e) => FetchOutcome::TransportError {
                        message: format!("Failed to read body: {}", e),
                        timed_out: e.is_timeout(),
                        elapsed: start.elapsed(),
                    },
                }
            }
            Err(e) => FetchOutcome::TransportError {
                message: describe_transport_error(&e),
                timed_out: e.is_timeout(),
                elapsed: start.elapsed(),
            },
        }
    }

    /// Issues a GET and returns the raw response for streaming consumers
    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(url).send().await
    }
}

/// Produces a short, stable description for a transport-level failure
fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection failed".to_string()
    } else {
        e.to_string()
    }
}

/// Cooperative cancellation flag shared across a worker pool
///
/// Setting the flag stops pools from claiming new work; in-flight requests
/// complete or time out on their own.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sleeps for an advisory politeness delay
///
/// With `jitter`, the actual pause is uniform in `[base, 2*base)`. A zero
/// base is a no-op so hot test paths skip the timer entirely.
pub async fn politeness_pause(base: Duration, jitter: bool) {
    if base.is_zero() {
        return;
    }
    let delay = if jitter {
        let extra = rand::thread_rng().gen_range(0..=base.as_millis() as u64);
        base + Duration::from_millis(extra)
    } else {
        base
    };
    tokio::time::sleep(delay).await;
}
