//! Crawl frontier: pending tasks plus the visited set
//!
//! All queue and visited-set operations go through one mutex, so the
//! claim (dequeue + visited test + visited insert + page-count check) is
//! atomic relative to concurrent workers: no two workers ever crawl the
//! same normalized URL in one session.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use url::Url;

/// One unit of crawl work; immutable once enqueued, consumed exactly once
#[derive(Debug, Clone)]
pub struct Task {
    /// Normalized page URL to fetch
    pub url: Url,

    /// Link-hops from the seed (seed = 0)
    pub depth: u32,
}

/// Result of asking the frontier for work
#[derive(Debug)]
pub enum Claim {
    /// A task was claimed; its URL is now marked visited
    Task(Task),

    /// Nothing queued right now (in-flight workers may still add links)
    Empty,

    /// The page-visit cap was reached; no further claims will succeed
    LimitReached,
}

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<Task>,
    /// URLs claimed for fetching (fetch failures stay here)
    visited: HashSet<String>,
    /// Everything ever queued, to dedup before enqueue
    enqueued: HashSet<String>,
    claimed: usize,
}

/// FIFO work queue with visited-set deduplication and a page cap
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<Inner>,
    limit_pages: Option<usize>,
}

impl Frontier {
    /// Creates a frontier seeded with one depth-0 task
    pub fn new(seed: Url, limit_pages: Option<usize>) -> Self {
        let mut inner = Inner::default();
        inner.enqueued.insert(seed.to_string());
        inner.queue.push_back(Task { url: seed, depth: 0 });

        Self {
            inner: Mutex::new(inner),
            limit_pages,
        }
    }

    /// Atomically claims the next unvisited task
    ///
    /// The claimed URL is marked visited before this returns, and the
    /// page counter is advanced; a later fetch failure does not un-claim
    /// it.
    pub fn claim_next(&self) -> Claim {
        let mut inner = self.inner.lock().unwrap();

        if let Some(limit) = self.limit_pages {
            if inner.claimed >= limit {
                return Claim::LimitReached;
            }
        }

        while let Some(task) = inner.queue.pop_front() {
            let key = task.url.to_string();
            if inner.visited.contains(&key) {
                continue;
            }
            inner.visited.insert(key);
            inner.claimed += 1;
            return Claim::Task(task);
        }

        Claim::Empty
    }

    /// Enqueues a follow-up task unless its URL was already queued or
    /// visited
    ///
    /// Returns true if the task was accepted.
    pub fn enqueue(&self, url: Url, depth: u32) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let key = url.to_string();
        if inner.visited.contains(&key) || !inner.enqueued.insert(key) {
            return false;
        }
        inner.queue.push_back(Task { url, depth });
        true
    }

    /// Number of pages claimed so far
    pub fn pages_claimed(&self) -> usize {
        self.inner.lock().unwrap().claimed
    }

    /// Number of tasks currently queued
    pub fn queue_len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_seed_is_first_claim() {
        let frontier = Frontier::new(url("https://example.com/"), None);
        match frontier.claim_next() {
            Claim::Task(task) => {
                assert_eq!(task.url.as_str(), "https://example.com/");
                assert_eq!(task.depth, 0);
            }
            other => panic!("expected task, got {:?}", other),
        }
    }

    #[test]
    fn test_claim_marks_visited() {
        let frontier = Frontier::new(url("https://example.com/"), None);
        assert!(matches!(frontier.claim_next(), Claim::Task(_)));

        // Re-enqueueing the same URL is rejected
        assert!(!frontier.enqueue(url("https://example.com/"), 1));
        assert!(matches!(frontier.claim_next(), Claim::Empty));
    }

    #[test]
    fn test_enqueue_dedup() {
        let frontier = Frontier::new(url("https://example.com/"), None);
        assert!(frontier.enqueue(url("https://example.com/a"), 1));
        assert!(!frontier.enqueue(url("https://example.com/a"), 1));
        assert_eq!(frontier.queue_len(), 2);
    }

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new(url("https://example.com/"), None);
        frontier.enqueue(url("https://example.com/a"), 1);
        frontier.enqueue(url("https://example.com/b"), 1);

        let mut order = Vec::new();
        while let Claim::Task(task) = frontier.claim_next() {
            order.push(task.url.to_string());
        }
        assert_eq!(
            order,
            vec![
                "https://example.com/",
                "https://example.com/a",
                "https://example.com/b",
            ]
        );
    }

    #[test]
    fn test_page_limit() {
        let frontier = Frontier::new(url("https://example.com/"), Some(2));
        frontier.enqueue(url("https://example.com/a"), 1);
        frontier.enqueue(url("https://example.com/b"), 1);

        assert!(matches!(frontier.claim_next(), Claim::Task(_)));
        assert!(matches!(frontier.claim_next(), Claim::Task(_)));
        assert!(matches!(frontier.claim_next(), Claim::LimitReached));
        assert_eq!(frontier.pages_claimed(), 2);
    }

    #[test]
    fn test_empty_vs_limit() {
        let frontier = Frontier::new(url("https://example.com/"), Some(10));
        assert!(matches!(frontier.claim_next(), Claim::Task(_)));
        assert!(matches!(frontier.claim_next(), Claim::Empty));
    }
}
