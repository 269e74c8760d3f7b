//! Media manifest, download summary, and feed metadata writers

use crate::download::{DownloadOutcome, DownloadStatus};
use crate::extract::ResourceRecord;
use crate::feed::FeedItem;
use crate::DragnetError;
use serde::Serialize;
use std::path::Path;

/// The serialized record of all resources discovered in one run
#[derive(Debug, Serialize)]
pub struct MediaManifest {
    pub start_url: String,
    pub collected_at: String,
    pub total_media: usize,
    pub media: Vec<ResourceRecord>,
}

impl MediaManifest {
    pub fn new(start_url: &str, media: Vec<ResourceRecord>) -> Self {
        Self {
            start_url: start_url.to_string(),
            collected_at: super::now_iso8601(),
            total_media: media.len(),
            media,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), DragnetError> {
        super::write_json(path, self)?;
        tracing::info!(path = %path.display(), total = self.total_media, "manifest written");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SummaryCounts {
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

/// Aggregated download results plus per-item detail
#[derive(Debug, Serialize)]
pub struct DownloadSummary {
    summary: SummaryCounts,
    results: Vec<DownloadOutcome>,
}

impl DownloadSummary {
    pub fn from_outcomes(results: Vec<DownloadOutcome>) -> Self {
        let count = |status: DownloadStatus| results.iter().filter(|o| o.status == status).count();
        Self {
            summary: SummaryCounts {
                downloaded: count(DownloadStatus::Saved),
                skipped: count(DownloadStatus::Skipped),
                failed: count(DownloadStatus::Failed),
            },
            results,
        }
    }

    pub fn downloaded(&self) -> usize {
        self.summary.downloaded
    }

    pub fn skipped(&self) -> usize {
        self.summary.skipped
    }

    pub fn failed(&self) -> usize {
        self.summary.failed
    }

    pub fn write(&self, path: &Path) -> Result<(), DragnetError> {
        super::write_json(path, self)?;
        tracing::info!(
            path = %path.display(),
            downloaded = self.summary.downloaded,
            skipped = self.summary.skipped,
            failed = self.summary.failed,
            "download summary written"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct FeedMediaEntry {
    url: String,
    title: String,
    post_id: String,
}

/// Metadata written beside a feed download batch
#[derive(Debug, Serialize)]
pub struct FeedMetadata {
    pub username: String,
    pub download_date: String,
    pub total_submissions: usize,
    pub total_media: usize,
    media_items: Vec<FeedMediaEntry>,
}

impl FeedMetadata {
    pub fn new(username: &str, total_submissions: usize, items: &[FeedItem]) -> Self {
        Self {
            username: username.to_string(),
            download_date: super::now_iso8601(),
            total_submissions,
            total_media: items.len(),
            media_items: items
                .iter()
                .map(|item| FeedMediaEntry {
                    url: item.url.clone(),
                    title: item.title.clone(),
                    post_id: item.post_id.clone(),
                })
                .collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), DragnetError> {
        super::write_json(path, self)
    }
}
