//! Pagination boundary search
//!
//! Discovers which page indices exist under a paginated base URL, either
//! by binary-searching for the highest index or by stepped linear probing
//! with skip-ahead and local backfill.
//!
//! Both searches assume page existence is monotonic (every index up to
//! some boundary exists). Real resource spaces can have holes (a deleted
//! middle page with valid later pages), and binary search will then
//! silently settle on a boundary below the true maximum. That assumption
//! is inherited, not verified.

use crate::extract::{extract_title, Extractor, MediaExtractor};
use crate::fetch::{CancelFlag, FetchOutcome, Fetcher};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Existence result for one probed page index
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    /// Page index under the base URL
    pub index: u64,

    /// Whether the page answered 200 with plausible content
    pub exists: bool,

    /// Hex SHA-256 of the body, only recorded in scrape mode
    pub content_digest: Option<String>,
}

/// Content scraped from one existing page
#[derive(Debug, Clone, Serialize)]
pub struct PageDump {
    pub index: u64,
    pub url: String,
    pub title: Option<String>,
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub content_digest: String,
}

/// Finds the highest existing page index in `[0, upper_bound]`
///
/// Binary search over the existence predicate. At each midpoint that
/// exists, `mid + 1` is probed as well: a hit at `mid` alone cannot
/// distinguish "inside the range" from "exactly at the boundary". A hit
/// at both lets the search skip past `mid + 1` directly.
///
/// Returns `None` when page 0 itself does not exist; callers must treat
/// that as "no pages found", not as a boundary.
///
/// `delay` separates successive probes to avoid hammering the target;
/// pass `Duration::ZERO` in tests.
pub async fn find_max_page<F, Fut>(probe: F, upper_bound: u64, delay: Duration) -> Option<u64>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut low: i64 = 0;
    let mut high: i64 = upper_bound as i64;

    while low <= high {
        let mid = low + (high - low) / 2;

        if probe(mid as u64).await {
            pause(delay).await;
            if !probe((mid + 1) as u64).await {
                return Some(mid as u64);
            }
            // mid + 1 exists too, so the boundary is at least there
            low = mid + 2;
        } else {
            high = mid - 1;
        }

        pause(delay).await;
    }

    if high < 0 {
        None
    } else {
        Some(high as u64)
    }
}

/// Linearly scans for existing pages starting at `start`
///
/// Advances one index at a time while pages exist. On a miss, probes
/// `current + step` as a skip-ahead; if that hits, the scan jumps there.
/// If both miss, a backward scan over the last step window recovers any
/// pages the skip jumped over, and the scan stops. Bounded by `timeout`
/// wall-clock time because existence may be sparse.
pub async fn scan_linear<F, Fut>(
    probe: F,
    start: u64,
    step: u64,
    timeout: Duration,
    delay: Duration,
) -> Vec<u64>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = bool>,
{
    let step = step.max(1);
    let mut current = start;
    let mut found: Vec<u64> = Vec::new();
    let started = Instant::now();

    while started.elapsed() < timeout {
        if probe(current).await {
            tracing::debug!(index = current, "page exists");
            found.push(current);
            current += 1;
        } else {
            pause(delay).await;
            if probe(current + step).await {
                current += step;
            } else {
                // The end is probably near; backfill the window the scan
                // may have skipped over, then stop.
                for offset in 1..step {
                    let candidate = match current.checked_sub(offset) {
                        Some(c) if c >= start => c,
                        _ => break,
                    };
                    if found.contains(&candidate) {
                        continue;
                    }
                    pause(delay).await;
                    if probe(candidate).await {
                        tracing::debug!(index = candidate, "recovered skipped page");
                        found.push(candidate);
                    }
                }
                break;
            }
        }

        pause(delay).await;
    }

    found.sort_unstable();
    found.dedup();
    found
}

/// Builds the URL for a page index under a base URL
pub fn page_url(base: &Url, index: u64) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), index)
}

/// Probes one page index over HTTP
///
/// A page exists when it answers 200 and the body passes a minimal
/// content sanity check (a `<body` tag). The digest is computed only for
/// existing pages when `with_digest` is set.
pub async fn probe_page(fetcher: &Fetcher, base: &Url, index: u64, with_digest: bool) -> PageRecord {
    let absent = PageRecord {
        index,
        exists: false,
        content_digest: None,
    };

    let target = page_url(base, index);
    let parsed = match Url::parse(&target) {
        Ok(u) => u,
        Err(_) => return absent,
    };

    match fetcher.fetch_page(&parsed).await {
        FetchOutcome::Response { status: 200, body, .. } => {
            let exists = body.to_lowercase().contains("<body");
            PageRecord {
                index,
                exists,
                content_digest: (exists && with_digest).then(|| content_digest(&body)),
            }
        }
        FetchOutcome::Response { .. } => absent,
        FetchOutcome::TransportError { message, .. } => {
            tracing::warn!(index, "error probing page: {}", message);
            absent
        }
    }
}

/// HTTP existence predicate for the boundary searches
pub async fn page_exists(fetcher: &Fetcher, base: &Url, index: u64) -> bool {
    probe_page(fetcher, base, index, false).await.exists
}

/// Fetches and dissects the given pages with a bounded worker pool
///
/// Pages that fail to fetch are skipped (they were seen to exist moments
/// ago; a race with the target is not fatal). Results are ordered by
/// index.
pub async fn scrape_pages(
    fetcher: &Fetcher,
    base: &Url,
    indices: &[u64],
    workers: usize,
    cancel: &CancelFlag,
) -> Vec<PageDump> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for &index in indices {
        if cancel.is_cancelled() {
            break;
        }
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => break,
        };

        let fetcher = fetcher.clone();
        let base = base.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let target = page_url(&base, index);
            let parsed = Url::parse(&target).ok()?;

            match fetcher.fetch_page(&parsed).await {
                FetchOutcome::Response { status: 200, body, .. } => {
                    Some(dissect_page(index, &parsed, &body))
                }
                _ => None,
            }
        });
    }

    let mut dumps = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some(dump)) = joined {
            dumps.push(dump);
        }
    }

    dumps.sort_by_key(|d| d.index);
    dumps
}

/// Extracts title, image URLs, links, and a content digest from a page
fn dissect_page(index: u64, url: &Url, body: &str) -> PageDump {
    let extraction = MediaExtractor::new().extract(body, url);

    PageDump {
        index,
        url: url.to_string(),
        title: extract_title(body),
        images: extraction.records.into_iter().map(|r| r.url).collect(),
        links: extraction.links.into_iter().map(|u| u.to_string()).collect(),
        content_digest: content_digest(body),
    }
}

/// Hex SHA-256 of a page body
pub fn content_digest(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Probe counter around a synthetic `exists(n) = n <= k` predicate
    fn counted_probe(k: i64, counter: Arc<AtomicUsize>) -> impl Fn(u64) -> std::future::Ready<bool> {
        move |n: u64| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready((n as i64) <= k)
        }
    }

    #[tokio::test]
    async fn test_binary_exact_boundary_for_every_k() {
        let upper = 100u64;
        // 2 * ceil(log2(upper + 1)) probes allowed per search
        let max_probes = 2 * (((upper + 1) as f64).log2().ceil() as usize);

        for k in 0..=upper {
            let counter = Arc::new(AtomicUsize::new(0));
            let probe = counted_probe(k as i64, counter.clone());
            let result = find_max_page(probe, upper, Duration::ZERO).await;
            assert_eq!(result, Some(k), "wrong boundary for k={}", k);
            let probes = counter.load(Ordering::SeqCst);
            assert!(
                probes <= max_probes,
                "k={}: {} probes exceeds the allowed {}",
                k,
                probes,
                max_probes
            );
        }
    }

    #[tokio::test]
    async fn test_binary_no_pages_at_all() {
        let counter = Arc::new(AtomicUsize::new(0));
        let probe = counted_probe(-1, counter);
        let result = find_max_page(probe, 1000, Duration::ZERO).await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_binary_boundary_at_upper_bound() {
        let counter = Arc::new(AtomicUsize::new(0));
        let probe = counted_probe(50, counter);
        assert_eq!(find_max_page(probe, 50, Duration::ZERO).await, Some(50));
    }

    #[tokio::test]
    async fn test_binary_single_page() {
        let counter = Arc::new(AtomicUsize::new(0));
        let probe = counted_probe(0, counter);
        assert_eq!(find_max_page(probe, 100, Duration::ZERO).await, Some(0));
    }

    #[tokio::test]
    async fn test_linear_contiguous_range() {
        let probe = |n: u64| std::future::ready(n <= 5);
        let found = scan_linear(probe, 0, 10, Duration::from_secs(30), Duration::ZERO).await;
        assert_eq!(found, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_linear_skips_over_hole() {
        // Pages 0..=2 and 8..=9 exist; the hole at 3..=7 is bridged by the
        // skip-ahead probe at 2+1(miss) then (2+1)+10... use step 7 so
        // 3 -> miss, 3+7=10 -> miss triggers backfill; with step 6,
        // 3+6=9 -> hit.
        let exists = |n: u64| n <= 2 || (8..=9).contains(&n);
        let probe = move |n: u64| std::future::ready(exists(n));
        let found = scan_linear(probe, 0, 6, Duration::from_secs(30), Duration::ZERO).await;
        assert!(found.contains(&0) && found.contains(&1) && found.contains(&2));
        assert!(found.contains(&9));
        // 8 is behind the skip landing point and recovered by the backfill
        assert!(found.contains(&8));
    }

    #[tokio::test]
    async fn test_linear_backfill_then_stop() {
        let probe = |n: u64| std::future::ready(n <= 3);
        let found = scan_linear(probe, 0, 5, Duration::from_secs(30), Duration::ZERO).await;
        assert_eq!(found, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_linear_nothing_exists() {
        let probe = |_: u64| std::future::ready(false);
        let found = scan_linear(probe, 0, 10, Duration::from_secs(30), Duration::ZERO).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_linear_respects_timeout() {
        // Every page exists; only the clock stops the scan.
        let probe = |_: u64| std::future::ready(true);
        let started = Instant::now();
        let found = scan_linear(probe, 0, 10, Duration::from_millis(50), Duration::ZERO).await;
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(!found.is_empty());
    }

    #[test]
    fn test_page_url() {
        let base = Url::parse("https://example.com/models/alice/").unwrap();
        assert_eq!(page_url(&base, 7), "https://example.com/models/alice/7");
        let base = Url::parse("https://example.com/models/alice").unwrap();
        assert_eq!(page_url(&base, 0), "https://example.com/models/alice/0");
    }

    #[test]
    fn test_content_digest_stable() {
        let a = content_digest("hello");
        let b = content_digest("hello");
        let c = content_digest("other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
