//! Probe result reports: JSON plus a flattened CSV mirror

use crate::classify::ExistenceRecord;
use crate::probe::count_found;
use crate::DragnetError;
use serde::Serialize;
use std::path::Path;

/// Full results of one probe run for one identifier
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub username: String,
    pub search_date: String,
    pub total_found: usize,
    pub total_checked: usize,
    pub results: Vec<ExistenceRecord>,
}

impl ProbeReport {
    pub fn new(username: &str, results: Vec<ExistenceRecord>) -> Self {
        Self {
            username: username.to_string(),
            search_date: super::now_iso8601(),
            total_found: count_found(&results),
            total_checked: results.len(),
            results,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), DragnetError> {
        super::write_json(path, self)?;
        tracing::info!(path = %path.display(), "probe report written");
        Ok(())
    }

    /// Writes the flattened CSV mirror of the JSON report
    pub fn write_csv(&self, path: &Path) -> Result<(), DragnetError> {
        let mut out = String::from("Platform,URL,Status,Status Code,Display Name\n");
        for record in &self.results {
            out.push_str(&csv_row(&[
                &record.platform,
                &record.url,
                record.status.label(),
                &record
                    .status_code
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                record.display_name.as_deref().unwrap_or(""),
            ]));
        }

        std::fs::write(path, out).map_err(|source| DragnetError::Persistence {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Formats one CSV row, quoting fields that need it
fn csv_row(fields: &[&str]) -> String {
    let mut row = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            row.push(',');
        }
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            row.push('"');
            row.push_str(&field.replace('"', "\"\""));
            row.push('"');
        } else {
            row.push_str(field);
        }
    }
    row.push('\n');
    row
}
