//! Media extraction from HTML pages
//!
//! Walks the media-bearing tags (including lazy-load attributes and
//! responsive source sets), then sweeps inline `style` attributes for
//! `url(...)` backgrounds.

use crate::extract::{Extraction, Extractor, MediaKind, ResourceRecord};
use crate::url::resolve_and_normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Media-bearing tag/attribute pairs, in extraction priority order
const MEDIA_TAGS: &[(&str, &str, MediaKind)] = &[
    ("img", "src", MediaKind::Image),
    ("img", "data-src", MediaKind::Image),
    ("img", "data-lazy", MediaKind::Image),
    ("source", "src", MediaKind::Mixed),
    ("video", "src", MediaKind::Video),
    ("video", "poster", MediaKind::Image),
    ("audio", "src", MediaKind::Audio),
    ("iframe", "src", MediaKind::Iframe),
];

/// Matches `url(...)` references inside a style value
static STYLE_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\(['"]?([^'")]+)['"]?\)"#).expect("valid style pattern"));

/// Extractor for generic media assets (images, video, audio, iframes)
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaExtractor;

impl MediaExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for MediaExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Extraction {
        let document = Html::parse_document(html);
        let mut sink = RecordSink::new(page_url);

        for &(tag, attr, kind) in MEDIA_TAGS {
            let selector = match Selector::parse(tag) {
                Ok(s) => s,
                Err(_) => continue,
            };

            for element in document.select(&selector) {
                if let Some(value) = element.value().attr(attr) {
                    sink.register(value, kind, &format!("<{} {}>", tag, attr));
                }

                // Responsive sets: first candidate of each comma-separated entry
                if attr == "src" {
                    if let Some(srcset) = element.value().attr("srcset") {
                        for chunk in srcset.split(',') {
                            if let Some(candidate) = chunk.trim().split(' ').next() {
                                sink.register(candidate, kind, &format!("<{} srcset>", tag));
                            }
                        }
                    }
                }

                sink.register_inline_style(element);
            }
        }

        // Backgrounds on arbitrary elements
        if let Ok(styled) = Selector::parse("[style]") {
            for element in document.select(&styled) {
                sink.register_inline_style(element);
            }
        }

        Extraction {
            records: sink.records,
            links: super::extract_links(&document, page_url),
        }
    }
}

/// Accumulates records for one page, deduplicating by normalized URL
struct RecordSink<'a> {
    page_url: &'a Url,
    seen: HashSet<String>,
    records: Vec<ResourceRecord>,
}

impl<'a> RecordSink<'a> {
    fn new(page_url: &'a Url) -> Self {
        Self {
            page_url,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn register(&mut self, candidate: &str, kind: MediaKind, context: &str) {
        let normalized = match resolve_and_normalize(self.page_url, candidate) {
            Some(url) => url.to_string(),
            None => return,
        };
        if !self.seen.insert(normalized.clone()) {
            return;
        }
        self.records.push(ResourceRecord {
            url: normalized,
            kind,
            context: context.to_string(),
            source_page: self.page_url.to_string(),
        });
    }

    fn register_inline_style(&mut self, element: ElementRef<'_>) {
        let style = match element.value().attr("style") {
            Some(s) => s,
            None => return,
        };
        let tag = element.value().name().to_string();
        for capture in STYLE_URL_PATTERN.captures_iter(style) {
            if let Some(m) = capture.get(1) {
                self.register(
                    m.as_str(),
                    MediaKind::StyleBackground,
                    &format!("<{} style>", tag),
                );
            }
        }
    }
}
