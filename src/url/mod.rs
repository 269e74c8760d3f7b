//! URL handling for the discovery engine
//!
//! Record identity throughout the engine is the normalized URL string, so
//! every candidate goes through [`normalize_url`] (or
//! [`resolve_and_normalize`] for relative candidates) before any
//! deduplication or visited-set test.

use crate::UrlError;
use url::Url;

/// Normalizes a URL string into the engine's canonical form
///
/// # Normalization Rules
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Lowercase the host
/// 5. Remove the fragment (everything after `#`)
///
/// Path and query are preserved as-is: two media URLs differing only in
/// query string are distinct resources.
///
/// # Examples
///
/// ```
/// use dragnet::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/img/a.png#frag").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/img/a.png");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = match url.host_str() {
        Some(h) => h.to_lowercase(),
        None => return Err(UrlError::MissingHost),
    };
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    url.set_fragment(None);

    Ok(url)
}

/// Resolves a possibly-relative candidate against a base page URL and
/// normalizes the result
///
/// Returns `None` for empty candidates, unresolvable references, and
/// anything that fails [`normalize_url`]; callers treat these as
/// non-links rather than errors.
pub fn resolve_and_normalize(base: &Url, candidate: &str) -> Option<Url> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let absolute = base.join(candidate).ok()?;
    normalize_url(absolute.as_str()).ok()
}

/// Extracts the lowercase host from a URL
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Tests whether two URLs share a host
///
/// Hosts are compared exactly (after lowercasing); `www.example.com` and
/// `example.com` are different hosts for scoping purposes.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(ha), Some(hb)) => ha == hb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_lowercase_host() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_preserve_query() {
        let result = normalize_url("https://example.com/img?size=large").unwrap();
        assert_eq!(result.as_str(), "https://example.com/img?size=large");
    }

    #[test]
    fn test_reject_invalid_scheme() {
        let result = normalize_url("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_reject_malformed() {
        assert!(normalize_url("not a url").is_err());
    }

    #[test]
    fn test_reject_missing_host() {
        // data URLs and the like have no host
        assert!(normalize_url("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_resolve_relative() {
        let base = Url::parse("https://example.com/gallery/index.html").unwrap();
        let resolved = resolve_and_normalize(&base, "../img/a.png").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/img/a.png");
    }

    #[test]
    fn test_resolve_absolute() {
        let base = Url::parse("https://example.com/").unwrap();
        let resolved = resolve_and_normalize(&base, "https://cdn.example.com/a.png").unwrap();
        assert_eq!(resolved.as_str(), "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let base = Url::parse("https://example.com/").unwrap();
        let resolved = resolve_and_normalize(&base, "/page#top").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_resolve_empty_candidate() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(resolve_and_normalize(&base, "").is_none());
        assert!(resolve_and_normalize(&base, "   ").is_none());
    }

    #[test]
    fn test_extract_host_lowercases() {
        let url = Url::parse("https://Sub.Example.COM/path").unwrap();
        assert_eq!(extract_host(&url), Some("sub.example.com".to_string()));
    }

    #[test]
    fn test_same_host() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com/b?x=1").unwrap();
        let c = Url::parse("https://www.example.com/a").unwrap();
        assert!(same_host(&a, &b));
        assert!(!same_host(&a, &c));
    }
}
