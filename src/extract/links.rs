//! Follow-up link and title extraction
//!
//! Links feed the crawl frontier; the crawler applies domain scoping and
//! depth limits, so this layer only filters out things that are not
//! navigable pages at all.

use crate::url::resolve_and_normalize;
use scraper::{Html, Selector};
use url::Url;

/// Extracts candidate follow-up links from a parsed document
///
/// Skips `javascript:`, `mailto:`, `tel:` and `data:` hrefs, fragment-only
/// anchors, and `<a download>` links. Results are normalized absolute
/// URLs; duplicates within the page are preserved (the frontier
/// deduplicates).
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return links,
    };

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.starts_with('#') {
            continue;
        }
        let lower = href.to_lowercase();
        if lower.starts_with("javascript:")
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
            || lower.starts_with("data:")
        {
            continue;
        }

        if let Some(url) = resolve_and_normalize(base_url, href) {
            links.push(url);
        }
    }

    links
}

/// Extracts the page title, if any
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
