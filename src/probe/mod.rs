//! Multi-platform existence probing
//!
//! One bounded worker pool per run, one task per platform, one attempt per
//! task. There is no shared retry state: a platform that fails is reported
//! as failed and the others proceed.

pub use crate::classify::ExistenceRecord;

use crate::classify::{classify, sort_for_display, ExistenceStatus, PlatformRegistry};
use crate::fetch::{CancelFlag, Fetcher};
use crate::DragnetError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Options for a probe run
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Worker-pool size
    pub workers: usize,

    /// Pause taken after a 429 before the response is reported
    pub rate_limit_pause: Duration,

    /// Cooperative cancellation; set to stop claiming new platforms
    pub cancel: CancelFlag,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            rate_limit_pause: Duration::from_secs(2),
            cancel: CancelFlag::new(),
        }
    }
}

/// Probes every platform in the registry for one identifier
///
/// Returns one [`ExistenceRecord`] per probed platform, sorted for
/// display (found first, then platform name). Cancellation stops new
/// platforms from being claimed; in-flight probes finish.
pub async fn run_probe(
    identifier: &str,
    registry: &PlatformRegistry,
    fetcher: &Fetcher,
    options: &ProbeOptions,
) -> Vec<ExistenceRecord> {
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut tasks = JoinSet::new();

    for platform in registry.iter() {
        if options.cancel.is_cancelled() {
            tracing::info!("probe cancelled; skipping remaining platforms");
            break;
        }

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => break,
        };

        let platform = platform.clone();
        let fetcher = fetcher.clone();
        let identifier = identifier.to_string();
        let rate_limit_pause = options.rate_limit_pause;

        tasks.spawn(async move {
            let _permit = permit;
            let url = platform.profile_url(&identifier);
            let parsed = match url::Url::parse(&url) {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!(platform = %platform.name, "bad profile URL {}: {}", url, e);
                    return ExistenceRecord {
                        platform: platform.name.clone(),
                        url,
                        status: ExistenceStatus::Error,
                        status_code: None,
                        display_name: None,
                    };
                }
            };

            let outcome = fetcher.fetch_page(&parsed).await;

            // Back off briefly after a 429; the response is still reported
            // as-is, with no re-check.
            if outcome.status() == Some(429) {
                tokio::time::sleep(rate_limit_pause).await;
            }

            classify(&platform, &url, &identifier, &outcome)
        });
    }

    let mut records = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(record) => {
                tracing::debug!(
                    platform = %record.platform,
                    status = record.status.label(),
                    "probe finished"
                );
                records.push(record);
            }
            Err(e) => tracing::error!("probe task panicked: {}", e),
        }
    }

    sort_for_display(&mut records);
    records
}

/// Counts the records classified as found
pub fn count_found(records: &[ExistenceRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.status == ExistenceStatus::Found)
        .count()
}

/// Loads identifiers from a wordlist file
///
/// One identifier per line; blank lines and `#` comment lines are skipped.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, DragnetError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_wordlist_skips_blanks_and_comments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# header comment").unwrap();
        writeln!(file, "alice").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  bob  ").unwrap();
        writeln!(file, "#carol").unwrap();
        file.flush().unwrap();

        let words = load_wordlist(file.path()).unwrap();
        assert_eq!(words, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_load_wordlist_missing_file() {
        assert!(load_wordlist(Path::new("/nonexistent/words.txt")).is_err());
    }

    #[test]
    fn test_count_found() {
        let mk = |status| ExistenceRecord {
            platform: "X".to_string(),
            url: String::new(),
            status,
            status_code: None,
            display_name: None,
        };
        let records = vec![
            mk(ExistenceStatus::Found),
            mk(ExistenceStatus::NotFound),
            mk(ExistenceStatus::Found),
        ];
        assert_eq!(count_found(&records), 2);
    }

    #[tokio::test]
    async fn test_cancelled_probe_claims_nothing() {
        let options = ProbeOptions {
            cancel: CancelFlag::new(),
            ..ProbeOptions::default()
        };
        options.cancel.cancel();

        let fetcher = Fetcher::new(&crate::fetch::ClientConfig::default()).unwrap();
        let registry = PlatformRegistry::builtin();
        let records = run_probe("alice", &registry, &fetcher, &options).await;
        assert!(records.is_empty());
    }
}
