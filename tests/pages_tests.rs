//! Integration tests for the pagination boundary scanner

use dragnet::fetch::{ClientConfig, Fetcher};
use dragnet::pages::{find_max_page, page_exists, probe_page, scan_linear, scrape_pages};
use dragnet::url::normalize_url;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Fetcher {
    Fetcher::new(&ClientConfig::default()).expect("client builds")
}

/// Mounts pages 0..=max under /models/alice/{n}; everything else is 404
async fn mount_pages(server: &MockServer, max: u64) {
    for index in 0..=max {
        Mock::given(method("GET"))
            .and(path(format!("/models/alice/{}", index)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><body><h1>Page {}</h1><img src=\"/img/{}.jpg\"></body></html>",
                index, index
            )))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_binary_search_over_http() {
    let server = MockServer::start().await;
    mount_pages(&server, 7).await;

    let base = normalize_url(&format!("{}/models/alice", server.uri())).unwrap();
    let fetcher = fetcher();

    let probe = {
        let fetcher = fetcher.clone();
        let base = base.clone();
        move |n: u64| {
            let fetcher = fetcher.clone();
            let base = base.clone();
            async move { page_exists(&fetcher, &base, n).await }
        }
    };

    let max = find_max_page(probe, 100, Duration::ZERO).await;
    assert_eq!(max, Some(7));
}

#[tokio::test]
async fn test_binary_search_no_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base = normalize_url(&format!("{}/models/ghost", server.uri())).unwrap();
    let fetcher = fetcher();

    let probe = move |n: u64| {
        let fetcher = fetcher.clone();
        let base = base.clone();
        async move { page_exists(&fetcher, &base, n).await }
    };

    assert_eq!(find_max_page(probe, 50, Duration::ZERO).await, None);
}

#[tokio::test]
async fn test_200_without_body_tag_does_not_count() {
    let server = MockServer::start().await;

    // A bare API response, not a page
    Mock::given(method("GET"))
        .and(path("/models/alice/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
        .mount(&server)
        .await;

    let base = normalize_url(&format!("{}/models/alice", server.uri())).unwrap();
    assert!(!page_exists(&fetcher(), &base, 0).await);
}

#[tokio::test]
async fn test_probe_page_records_digest_when_asked() {
    let server = MockServer::start().await;
    mount_pages(&server, 1).await;

    let base = normalize_url(&format!("{}/models/alice", server.uri())).unwrap();
    let fetcher = fetcher();

    let with_digest = probe_page(&fetcher, &base, 0, true).await;
    assert!(with_digest.exists);
    assert_eq!(with_digest.content_digest.as_ref().unwrap().len(), 64);

    let without_digest = probe_page(&fetcher, &base, 0, false).await;
    assert!(without_digest.exists);
    assert!(without_digest.content_digest.is_none());

    let missing = probe_page(&fetcher, &base, 9, true).await;
    assert!(!missing.exists);
    assert!(missing.content_digest.is_none());
}

#[tokio::test]
async fn test_linear_scan_over_http() {
    let server = MockServer::start().await;
    mount_pages(&server, 4).await;

    let base = normalize_url(&format!("{}/models/alice", server.uri())).unwrap();
    let fetcher = fetcher();

    let probe = move |n: u64| {
        let fetcher = fetcher.clone();
        let base = base.clone();
        async move { page_exists(&fetcher, &base, n).await }
    };

    let found = scan_linear(probe, 0, 5, Duration::from_secs(30), Duration::ZERO).await;
    assert_eq!(found, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_scrape_pages_dumps_content() {
    let server = MockServer::start().await;
    mount_pages(&server, 2).await;

    let base = normalize_url(&format!("{}/models/alice", server.uri())).unwrap();
    let cancel = dragnet::fetch::CancelFlag::new();

    let dumps = scrape_pages(&fetcher(), &base, &[0, 1, 2], 2, &cancel).await;

    assert_eq!(dumps.len(), 3);
    assert_eq!(dumps[0].index, 0);
    assert_eq!(dumps[2].index, 2);

    for dump in &dumps {
        assert_eq!(dump.content_digest.len(), 64);
        assert_eq!(dump.images.len(), 1);
        assert!(dump.images[0].ends_with(&format!("/img/{}.jpg", dump.index)));
    }

    // Distinct bodies hash differently
    assert_ne!(dumps[0].content_digest, dumps[1].content_digest);
}
