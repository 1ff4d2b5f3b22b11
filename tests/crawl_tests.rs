//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the
//! fetcher, the listing paginator and the full crawl cycle end-to-end.

use listing_harvest::config::{Config, FetchConfig, ListingConfig};
use listing_harvest::crawler::{run_crawl, DelayRange, Fetcher, Paginator};
use listing_harvest::{AttemptError, HarvestError};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/list/show/1.Test_List";

/// Creates a test configuration pointing at the mock server, with no delays
fn create_test_config(server: &MockServer, dir: &TempDir, target_count: usize) -> Config {
    let mut config = Config::default();
    config.listing.url = format!("{}{}", server.uri(), LIST_PATH);
    config.listing.target_count = target_count;
    config.listing.max_pages = 10;
    config.fetch.timeout_secs = 5;
    config.fetch.max_attempts = 2;
    config.fetch.backoff = DelayRange::ZERO;
    config.politeness.page_delay = DelayRange::ZERO;
    config.politeness.item_delay = DelayRange::ZERO;
    config.output.records_path = dir.path().join("items.jsonl").display().to_string();
    config.output.failures_path = dir.path().join("failed.txt").display().to_string();
    config
}

fn fast_fetch_config(max_attempts: u32) -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        max_attempts,
        backoff: DelayRange::ZERO,
        ..FetchConfig::default()
    }
}

fn listing_page(slugs: &[&str]) -> String {
    let rows: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<tr><td><a class="bookTitle" href="/book/show/{slug}?from_search=true"><span>{slug}</span></a></td></tr>"#
            )
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

fn detail_page(title: &str) -> String {
    format!(
        r#"<html lang="en"><head>
        <script type="application/ld+json">
        {{"@type": "Book", "name": "{title}", "author": [{{"@type": "Person", "name": "Some Author"}}],
          "aggregateRating": {{"ratingValue": 4.2, "ratingCount": 1000}}, "numberOfPages": 320}}
        </script></head>
        <body><p>320 pages, Hardcover</p><p>First published March 3, 1999</p></body></html>"#
    )
}

async fn mount_listing_page(server: &MockServer, page: &str, slugs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(slugs)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/book/show/{slug}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(slug)))
        .mount(server)
        .await;
}

fn read_records(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("record line is JSON"))
        .collect()
}

fn record_urls(path: &Path) -> Vec<String> {
    read_records(path)
        .iter()
        .map(|record| record["book_url"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_resumes_and_preserves_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 3);
    let base = server.uri();

    mount_listing_page(&server, "1", &["1.A", "2.B"]).await;
    mount_listing_page(&server, "2", &["3.C"]).await;
    mount_listing_page(&server, "3", &[]).await;
    mount_detail(&server, "1.A").await;
    mount_detail(&server, "3.C").await;

    // B is already persisted and must never be fetched again
    Mock::given(method("GET"))
        .and(path("/book/show/2.B"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("2.B")))
        .expect(0)
        .mount(&server)
        .await;

    let records_path = Path::new(&config.output.records_path).to_path_buf();
    std::fs::write(
        &records_path,
        format!("{{\"book_url\": \"{base}/book/show/2.B\", \"title\": \"B\"}}\n"),
    )
    .unwrap();

    let summary = run_crawl(config.clone()).await.unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.resumed, 1);
    assert_eq!(summary.crawled, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        record_urls(&records_path),
        vec![
            format!("{base}/book/show/2.B"),
            format!("{base}/book/show/1.A"),
            format!("{base}/book/show/3.C"),
        ]
    );

    let records = read_records(&records_path);
    assert_eq!(records[1]["title"], "1.A");
    assert_eq!(records[1]["author"], "Some Author");
    assert_eq!(records[1]["rating"], "4.2");
    assert_eq!(records[1]["pages"], 320);
    assert_eq!(records[1]["published_year"], 1999);
    assert_eq!(records[1]["language"], "en");

    // A second run over the same output has nothing left to do
    let summary = run_crawl(config).await.unwrap();
    assert_eq!(summary.crawled, 0);
    assert_eq!(summary.resumed, 3);
    assert_eq!(record_urls(&records_path).len(), 3);
}

#[tokio::test]
async fn test_failed_detail_goes_to_failure_log() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 10);
    let base = server.uri();

    mount_listing_page(&server, "1", &["1.A", "2.B", "3.C"]).await;
    mount_listing_page(&server, "2", &[]).await;
    mount_detail(&server, "1.A").await;
    mount_detail(&server, "3.C").await;

    Mock::given(method("GET"))
        .and(path("/book/show/2.B"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let summary = run_crawl(config.clone()).await.unwrap();
    assert_eq!(summary.crawled, 2);
    assert_eq!(summary.failed, 1);

    assert_eq!(
        record_urls(Path::new(&config.output.records_path)),
        vec![
            format!("{base}/book/show/1.A"),
            format!("{base}/book/show/3.C"),
        ]
    );

    let failures = std::fs::read_to_string(&config.output.failures_path).unwrap();
    let lines: Vec<&str> = failures.lines().collect();
    assert_eq!(lines.len(), 1);

    let (url, reason) = lines[0].split_once('\t').unwrap();
    assert_eq!(url, format!("{base}/book/show/2.B"));
    assert!(reason.contains("404"));
}

#[tokio::test]
async fn test_empty_detail_body_is_logged_as_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 1);

    mount_listing_page(&server, "1", &["1.A"]).await;
    Mock::given(method("GET"))
        .and(path("/book/show/1.A"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;

    let summary = run_crawl(config.clone()).await.unwrap();
    assert_eq!(summary.crawled, 0);
    assert_eq!(summary.failed, 1);

    let failures = std::fs::read_to_string(&config.output.failures_path).unwrap();
    assert!(failures.contains("Document is empty"));
    assert!(read_records(Path::new(&config.output.records_path)).is_empty());
}

#[tokio::test]
async fn test_pagination_stops_at_empty_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 100);

    mount_listing_page(&server, "1", &["1.A", "2.B"]).await;
    mount_listing_page(&server, "2", &[]).await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["9.Z"])))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&config.fetch).unwrap();
    let paginator = Paginator::new(&config.listing, DelayRange::ZERO).unwrap();
    let links = paginator
        .collect_links(&fetcher, &config.listing.url, 100, 10)
        .await
        .unwrap();

    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn test_pagination_stops_at_target() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 4);

    mount_listing_page(&server, "1", &["1.A", "2.B", "3.C"]).await;
    mount_listing_page(&server, "2", &["3.C", "4.D", "5.E", "6.F"]).await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["9.Z"])))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&config.fetch).unwrap();
    let paginator = Paginator::new(&config.listing, DelayRange::ZERO).unwrap();
    let links = paginator
        .collect_links(&fetcher, &config.listing.url, 4, 10)
        .await
        .unwrap();

    let paths: Vec<&str> = links.iter().map(|url| url.path()).collect();
    assert_eq!(
        paths,
        vec![
            "/book/show/1.A",
            "/book/show/2.B",
            "/book/show/3.C",
            "/book/show/4.D"
        ]
    );
    assert!(links.iter().all(|url| url.query().is_none()));
}

#[tokio::test]
async fn test_listing_with_existing_query_joins_page_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("sort", "rating"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["1.A"])))
        .expect(1)
        .mount(&server)
        .await;

    let listing = ListingConfig {
        url: format!("{}{}?sort=rating", server.uri(), LIST_PATH),
        ..ListingConfig::default()
    };
    let fetcher = Fetcher::new(&fast_fetch_config(1)).unwrap();
    let paginator = Paginator::new(&listing, DelayRange::ZERO).unwrap();
    let links = paginator
        .collect_links(&fetcher, &listing.url, 1, 5)
        .await
        .unwrap();

    assert_eq!(links.len(), 1);
}

#[tokio::test]
async fn test_first_listing_page_failure_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 10);

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = run_crawl(config.clone()).await;
    assert!(matches!(result, Err(HarvestError::Fetch(_))));
    assert!(read_records(Path::new(&config.output.records_path)).is_empty());
}

#[tokio::test]
async fn test_later_listing_page_failure_keeps_collected_links() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, 10);

    mount_listing_page(&server, "1", &["1.A", "2.B"]).await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&config.fetch).unwrap();
    let paginator = Paginator::new(&config.listing, DelayRange::ZERO).unwrap();
    let links = paginator
        .collect_links(&fetcher, &config.listing.url, 10, 10)
        .await
        .unwrap();

    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn test_fetch_retries_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&fast_fetch_config(3)).unwrap();
    let body = fetcher
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "ok");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_fetch_gives_up_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&fast_fetch_config(3)).unwrap();
    let failure = fetcher
        .fetch(&format!("{}/down", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(failure.attempts, 3);
    assert!(matches!(
        failure.last_error,
        AttemptError::Status(status) if status.as_u16() == 503
    ));
}

#[tokio::test]
async fn test_slow_response_times_out_and_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let config = FetchConfig {
        timeout_secs: 1,
        ..fast_fetch_config(2)
    };
    let fetcher = Fetcher::new(&config).unwrap();
    let failure = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(failure.attempts, 2);
    assert!(matches!(
        failure.last_error,
        AttemptError::Transport(ref e) if e.is_timeout()
    ));
}

#[tokio::test]
async fn test_fetch_sends_identity_headers() {
    let server = MockServer::start().await;
    let config = FetchConfig {
        user_agent: "HarvestTest/1.0".to_string(),
        accept_language: "de-DE".to_string(),
        ..fast_fetch_config(1)
    };

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .and(header("accept-language", "de-DE"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&config).unwrap();
    let body = fetcher
        .fetch(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "hello");
}
