//! Report and manifest writers
//!
//! Everything the engine persists besides downloaded payloads: the media
//! manifest, the download summary, probe reports (JSON plus a flattened
//! CSV mirror), and the pagination outputs.

mod manifest;
mod pages_report;
mod probe_report;

pub use manifest::{DownloadSummary, FeedMetadata, MediaManifest};
pub use pages_report::PagesReport;
pub use probe_report::ProbeReport;

use crate::DragnetError;
use std::path::Path;

/// Serializes a value as pretty JSON to a file
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), DragnetError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|source| DragnetError::Persistence {
        path: path.display().to_string(),
        source,
    })
}

/// Current time as an ISO-8601 UTC string
pub(crate) fn now_iso8601() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
