//! Extraction strategies
//!
//! An [`Extractor`] turns one fetched page into structured resource
//! records plus candidate follow-up links. Strategies are pluggable: the
//! crawler is generic over the extractor, and new source kinds implement
//! the trait without touching the orchestrator.

mod links;
mod media;

pub use links::{extract_links, extract_title};
pub use media::MediaExtractor;

use serde::Serialize;
use url::Url;

/// The kind of media a resource record points at, by tag/context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Iframe,
    StyleBackground,
    /// `<source>` elements, which may feed either video or audio
    Mixed,
}

/// One discovered media resource
///
/// Identity is the normalized `url`; the aggregator keeps the first-seen
/// record for each URL and drops later duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceRecord {
    /// Normalized resource URL
    pub url: String,

    /// Media kind, by the tag/attribute it was found in
    #[serde(rename = "type")]
    pub kind: MediaKind,

    /// Where on the page the URL came from, e.g. `<img src>`
    pub context: String,

    /// The fetched page this record was extracted from
    pub source_page: String,
}

/// Output of one extraction pass over a page
#[derive(Debug, Default)]
pub struct Extraction {
    /// Media records found on the page, deduplicated within the page
    pub records: Vec<ResourceRecord>,

    /// Candidate follow-up links, normalized, not yet domain-filtered
    pub links: Vec<Url>,
}

/// A strategy turning a fetched page into records and follow-up links
///
/// Implementations must be pure with respect to their inputs: the same
/// page yields the same records regardless of worker-pool size or timing.
pub trait Extractor: Send + Sync {
    /// Extracts records and links from the page body
    ///
    /// Malformed content is never an error; the worst case is an empty
    /// extraction.
    fn extract(&self, html: &str, page_url: &Url) -> Extraction;
}
