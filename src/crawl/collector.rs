//! Crawl orchestration
//!
//! The collector drives the frontier with a bounded worker pool: claims
//! are serialized through the frontier mutex, fetch + extract run
//! concurrently, and discovered links come back to the coordinator loop
//! for scoping and enqueueing.

use crate::crawl::frontier::{Claim, Frontier, Task};
use crate::crawl::RecordSet;
use crate::extract::{Extraction, Extractor, ResourceRecord};
use crate::fetch::{politeness_pause, CancelFlag, FetchOutcome, Fetcher};
use crate::url::{extract_host, same_host};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Options for one crawl run
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Maximum link-hops from the seed
    pub max_depth: u32,

    /// Whether to follow same-domain links at all
    pub follow_links: bool,

    /// Maximum number of pages to visit
    pub limit_pages: Option<usize>,

    /// Worker-pool size
    pub workers: usize,

    /// Advisory pause before each fetch
    pub politeness_delay: Duration,

    /// Cooperative cancellation; set to stop claiming new pages
    pub cancel: CancelFlag,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            follow_links: false,
            limit_pages: None,
            workers: 4,
            politeness_delay: Duration::ZERO,
            cancel: CancelFlag::new(),
        }
    }
}

/// Orchestrates crawling with a pluggable extraction strategy
pub struct Collector<E: Extractor> {
    fetcher: Fetcher,
    extractor: Arc<E>,
}

impl<E: Extractor + 'static> Collector<E> {
    /// Creates a collector around a fetcher and an extractor
    pub fn new(fetcher: Fetcher, extractor: E) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
        }
    }

    /// Crawls from the seed and returns the unique records found
    ///
    /// Breadth-first within the seed's host. Fetch failures are logged and
    /// the page stays visited; nothing short of an invalid seed aborts the
    /// run. Records are returned sorted by URL.
    pub async fn collect(&self, seed: &Url, options: &CollectOptions) -> Vec<ResourceRecord> {
        let seed_host = extract_host(seed);
        let frontier = Arc::new(Frontier::new(seed.clone(), options.limit_pages));
        let records = Arc::new(RecordSet::new());
        let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
        let mut workers: JoinSet<(Task, Option<Extraction>)> = JoinSet::new();

        loop {
            // Fold in finished workers without blocking; their links may
            // refill the queue before the next claim.
            while let Some(joined) = workers.try_join_next() {
                self.absorb(joined, seed, seed_host.as_deref(), &frontier, options);
            }

            if options.cancel.is_cancelled() {
                tracing::info!("crawl cancelled; waiting for in-flight fetches");
                break;
            }

            match frontier.claim_next() {
                Claim::Task(task) => {
                    let permit = match semaphore.clone().acquire_owned().await {
                        Ok(p) => p,
                        Err(_) => break,
                    };
                    let fetcher = self.fetcher.clone();
                    let extractor = Arc::clone(&self.extractor);
                    let record_set = Arc::clone(&records);
                    let delay = options.politeness_delay;

                    workers.spawn(async move {
                        let _permit = permit;
                        politeness_pause(delay, true).await;
                        let extraction = fetch_and_extract(&fetcher, &*extractor, &task).await;
                        if let Some(extraction) = &extraction {
                            let kept = record_set.extend(extraction.records.iter().cloned());
                            tracing::info!(
                                url = %task.url,
                                found = extraction.records.len(),
                                new = kept,
                                "extracted media"
                            );
                        }
                        (task, extraction)
                    });
                }
                Claim::LimitReached => {
                    tracing::info!("page limit reached, stopping crawl");
                    break;
                }
                Claim::Empty => {
                    // Queue is dry; if nothing is in flight the crawl is
                    // done, otherwise wait for a worker to report back.
                    match workers.join_next().await {
                        Some(joined) => {
                            self.absorb(joined, seed, seed_host.as_deref(), &frontier, options)
                        }
                        None => break,
                    }
                }
            }
        }

        // Let in-flight fetches finish; their records still count, and
        // any links they enqueue are simply never claimed.
        while let Some(joined) = workers.join_next().await {
            self.absorb(joined, seed, seed_host.as_deref(), &frontier, options);
        }

        tracing::info!(
            pages = frontier.pages_claimed(),
            records = records.len(),
            "crawl finished"
        );

        Arc::try_unwrap(records)
            .unwrap_or_default()
            .into_sorted_records()
    }

    /// Processes one finished worker: enqueue its follow-up links
    fn absorb(
        &self,
        joined: Result<(Task, Option<Extraction>), tokio::task::JoinError>,
        seed: &Url,
        seed_host: Option<&str>,
        frontier: &Frontier,
        options: &CollectOptions,
    ) {
        let (task, extraction) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!("crawl worker panicked: {}", e);
                return;
            }
        };

        let extraction = match extraction {
            Some(e) => e,
            None => return,
        };

        if !options.follow_links || task.depth >= options.max_depth {
            return;
        }

        for link in extraction.links {
            let in_scope = seed_host.is_some() && same_host(seed, &link);
            if !in_scope {
                continue;
            }
            if frontier.enqueue(link.clone(), task.depth + 1) {
                tracing::debug!(url = %link, depth = task.depth + 1, "queued follow-up link");
            }
        }
    }
}

/// Fetches one page and runs extraction; `None` means the fetch failed
async fn fetch_and_extract<E: Extractor + ?Sized>(
    fetcher: &Fetcher,
    extractor: &E,
    task: &Task,
) -> Option<Extraction> {
    match fetcher.fetch_page(&task.url).await {
        FetchOutcome::Response { status, body, .. } if (200..300).contains(&status) => {
            Some(extractor.extract(&body, &task.url))
        }
        FetchOutcome::Response { status, .. } => {
            tracing::warn!(url = %task.url, status, "skipping page with error status");
            None
        }
        FetchOutcome::TransportError { message, .. } => {
            tracing::warn!(url = %task.url, "failed to read page: {}", message);
            None
        }
    }
}
