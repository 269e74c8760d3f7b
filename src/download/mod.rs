//! Concurrent payload downloader
//!
//! One bounded worker pool per batch, one task per record. Filenames are
//! derived deterministically from the URL path; a destination that
//! already exists is skipped without comparing content. Distinct URLs can
//! sanitize to the same filename: the first writer wins and later ones
//! report `skipped`. Resolving that (e.g. content-hash suffixes) is an
//! open question left to callers who need it.

use crate::extract::ResourceRecord;
use crate::fetch::{classify_status, CancelFlag, Fetcher, RetryDecision, RetryPolicy};
use futures_util::StreamExt;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fallback filename when the URL path has no usable basename
const FALLBACK_FILENAME: &str = "media";

/// Terminal state of one download task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Saved,
    Skipped,
    Failed,
}

/// Outcome for one submitted record; every record yields exactly one
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    /// The record's URL
    pub url: String,

    /// Destination path, absent when nothing was written
    pub path: Option<String>,

    /// Terminal status
    pub status: DownloadStatus,

    /// Why the task skipped or failed
    pub reason: Option<String>,
}

/// Batch downloader with a bounded worker pool
pub struct Downloader {
    fetcher: Fetcher,
    workers: usize,
    retry_policy: RetryPolicy,
    cancel: CancelFlag,
}

impl Downloader {
    /// Creates a downloader; `retry_policy` is consulted on every failed
    /// attempt (use [`RetryPolicy::none`] for single-attempt semantics)
    pub fn new(fetcher: Fetcher, workers: usize, retry_policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
            retry_policy,
            cancel: CancelFlag::new(),
        }
    }

    /// Installs a shared cancellation flag
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Downloads every record into `dest`, returning one outcome per
    /// record in completion order
    ///
    /// Individual failures never abort the batch. Only an unusable
    /// destination directory is a hard error, reported as a `failed`
    /// outcome for every record by the caller's summary.
    pub async fn download_all(
        &self,
        records: &[ResourceRecord],
        dest: &Path,
    ) -> std::io::Result<Vec<DownloadOutcome>> {
        std::fs::create_dir_all(dest)?;

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for record in records {
            if self.cancel.is_cancelled() {
                tracing::info!("download cancelled; skipping remaining records");
                break;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };

            let fetcher = self.fetcher.clone();
            let policy = self.retry_policy.clone();
            let url = record.url.clone();
            let dest = dest.to_path_buf();

            tasks.spawn(async move {
                let _permit = permit;
                download_one(&fetcher, &policy, &url, &dest).await
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!("download task panicked: {}", e),
            }
        }
        Ok(outcomes)
    }
}

/// Downloads a single URL, honoring the retry policy
async fn download_one(
    fetcher: &Fetcher,
    policy: &RetryPolicy,
    url: &str,
    dest: &Path,
) -> DownloadOutcome {
    let filename = derive_filename(url);
    let path = dest.join(&filename);

    if path.exists() {
        tracing::debug!(url, path = %path.display(), "already present");
        return DownloadOutcome {
            url: url.to_string(),
            path: Some(path.display().to_string()),
            status: DownloadStatus::Skipped,
            reason: Some("already exists".to_string()),
        };
    }

    let mut attempt = 0u32;
    loop {
        attempt += 1;

        let (status_code, message) = match stream_to_file(fetcher, url, &path).await {
            Ok(()) => {
                tracing::info!(url, path = %path.display(), "saved");
                return DownloadOutcome {
                    url: url.to_string(),
                    path: Some(path.display().to_string()),
                    status: DownloadStatus::Saved,
                    reason: None,
                };
            }
            Err(e) => e,
        };

        // A partial file would masquerade as complete on the next run
        let _ = tokio::fs::remove_file(&path).await;

        match policy.should_retry(classify_status(status_code), attempt) {
            RetryDecision::Retry { delay } => {
                tracing::info!(
                    url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying download: {}",
                    message
                );
                tokio::time::sleep(delay).await;
            }
            RetryDecision::Stop { .. } => {
                tracing::warn!(url, attempt, "download failed: {}", message);
                return DownloadOutcome {
                    url: url.to_string(),
                    path: None,
                    status: DownloadStatus::Failed,
                    reason: Some(message),
                };
            }
        }
    }
}

/// One streamed fetch attempt; the error carries the status code (if any)
/// for retry classification
async fn stream_to_file(
    fetcher: &Fetcher,
    url: &str,
    path: &Path,
) -> Result<(), (Option<u16>, String)> {
    let response = fetcher
        .get(url)
        .await
        .map_err(|e| (None, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err((Some(status.as_u16()), format!("HTTP {}", status.as_u16())));
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| (None, format!("Failed to create {}: {}", path.display(), e)))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| (None, e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| (None, format!("Failed to write {}: {}", path.display(), e)))?;
    }
    file.flush()
        .await
        .map_err(|e| (None, format!("Failed to flush {}: {}", path.display(), e)))?;

    Ok(())
}

/// Derives a deterministic, sanitized filename from a URL's path
///
/// Keeps `[A-Za-z0-9._-]`, replaces everything else with `_`; an empty
/// basename becomes `media`.
pub fn derive_filename(url: &str) -> String {
    let basename = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .unwrap_or_default();

    let sanitized: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Returns the destination path a record would be written to
pub fn destination_path(dest: &Path, url: &str) -> PathBuf {
    dest.join(derive_filename(url))
}
