//! Pagination scan outputs: URL list, JSON summary, per-page dumps

use crate::pages::PageDump;
use crate::DragnetError;
use serde::Serialize;
use std::path::Path;

/// Summary of one boundary scan
#[derive(Debug, Serialize)]
pub struct PagesReport {
    pub base_url: String,
    pub total_pages: usize,
    pub pages: Vec<u64>,
    pub timestamp: i64,
}

impl PagesReport {
    pub fn new(base_url: &str, mut pages: Vec<u64>) -> Self {
        pages.sort_unstable();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            total_pages: pages.len(),
            pages,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Writes the plain-text URL list, one `base/index` line per page
    pub fn write_urls(&self, path: &Path) -> Result<(), DragnetError> {
        let mut out = String::new();
        for index in &self.pages {
            out.push_str(&format!("{}/{}\n", self.base_url, index));
        }
        std::fs::write(path, out).map_err(|source| DragnetError::Persistence {
            path: path.display().to_string(),
            source,
        })
    }

    /// Writes the JSON summary
    pub fn write_json(&self, path: &Path) -> Result<(), DragnetError> {
        super::write_json(path, self)?;
        tracing::info!(path = %path.display(), pages = self.total_pages, "pages summary written");
        Ok(())
    }

    /// Writes one JSON dump per scraped page into `dir`
    pub fn write_page_dumps(dir: &Path, dumps: &[PageDump]) -> Result<(), DragnetError> {
        for dump in dumps {
            let path = dir.join(format!("page_{}.json", dump.index));
            super::write_json(&path, dump)?;
        }
        Ok(())
    }
}
