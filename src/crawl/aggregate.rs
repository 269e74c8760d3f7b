//! Result aggregation
//!
//! Collects resource records across concurrent workers, deduplicated by
//! normalized URL with first-insert-wins semantics. The set is unordered
//! until [`RecordSet::into_sorted_records`] applies the explicit sort at
//! aggregation time.

use crate::extract::ResourceRecord;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    seen: HashSet<String>,
    records: Vec<ResourceRecord>,
}

/// Concurrent, idempotent record set
#[derive(Debug, Default)]
pub struct RecordSet {
    inner: Mutex<Inner>,
}

impl RecordSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record unless its URL is already present
    ///
    /// Returns true if the record was kept. The membership test and the
    /// insertion happen under one lock, so concurrent duplicate inserts
    /// resolve to exactly one winner.
    pub fn insert(&self, record: ResourceRecord) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.seen.insert(record.url.clone()) {
            return false;
        }
        inner.records.push(record);
        true
    }

    /// Inserts every record, returning how many were kept
    pub fn extend(&self, records: impl IntoIterator<Item = ResourceRecord>) -> usize {
        records
            .into_iter()
            .filter(|record| self.insert(record.clone()))
            .count()
    }

    /// Number of unique records collected
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the set, returning records sorted by URL
    pub fn into_sorted_records(self) -> Vec<ResourceRecord> {
        let mut records = self.inner.into_inner().unwrap().records;
        records.sort_by(|a, b| a.url.cmp(&b.url));
        records
    }
}
