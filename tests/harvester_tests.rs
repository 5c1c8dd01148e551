mod common;

use std::sync::atomic::{AtomicBool, Ordering};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use backurls::harvester::{CommonCrawlClient, UrlHarvester, VirusTotalClient, WaybackClient};
use backurls::record::Source;

const INDEX: &str = "CC-MAIN-2018-22";

fn harvester_for(server: &MockServer, api_key: Option<&str>) -> UrlHarvester {
    let client = reqwest::Client::new();
    UrlHarvester::from_clients(
        WaybackClient::new(client.clone(), server.uri()),
        CommonCrawlClient::new(client.clone(), server.uri(), INDEX),
        VirusTotalClient::new(client, server.uri(), api_key.map(String::from)),
        10,
    )
}

#[tokio::test]
async fn wayback_client_parses_cdx_and_skips_short_rows() {
    let server = MockServer::start().await;
    let rows = serde_json::json!([
        ["urlkey", "timestamp", "original"],
        ["key", "20230101000000", "https://example.com/a"],
        ["short-row"],
        ["key", "20230202000000", "https://example.com/b"],
    ]);
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&server)
        .await;

    let client = WaybackClient::new(reqwest::Client::new(), server.uri());
    let records = client.fetch("example.com", false).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, "https://example.com/a");
    assert_eq!(records[0].timestamp, "20230101000000");
    assert_eq!(records[0].source, Source::Wayback);
}

#[tokio::test]
async fn commoncrawl_client_skips_unparseable_lines() {
    let server = MockServer::start().await;
    let ndjson = concat!(
        r#"{"url": "https://example.com/page1", "timestamp": "20180501000000"}"#,
        "\n",
        "this line is not json\n",
        r#"{"url": "https://example.com/page2", "timestamp": "20180502000000"}"#,
        "\n",
    );
    common::mount_commoncrawl(&server, INDEX, "example.com", ndjson).await;

    let client = CommonCrawlClient::new(reqwest::Client::new(), server.uri(), INDEX);
    let records = client.fetch("example.com", false).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].url, "https://example.com/page2");
    assert_eq!(records[1].source, Source::CommonCrawl);
}

#[tokio::test]
async fn virustotal_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = VirusTotalClient::new(reqwest::Client::new(), server.uri(), None);
    assert!(!client.is_enabled());
    assert!(client.fetch("example.com").await.is_empty());
}

#[tokio::test]
async fn merged_count_is_additive_across_sources() {
    let server = MockServer::start().await;
    // Three sources returning 2, 0, and 1 records respectively.
    common::mount_cdx(
        &server,
        "example.com",
        &[
            ("20230101000000", "https://example.com/a"),
            ("20230202000000", "https://example.com/b"),
        ],
    )
    .await;
    common::mount_commoncrawl(&server, INDEX, "example.com", "").await;
    common::mount_virustotal(&server, "example.com", &["https://example.com/c"]).await;

    let harvester = harvester_for(&server, Some("test-key"));
    let cancelled = AtomicBool::new(false);
    let records = harvester
        .harvest_all(&["example.com".to_string()], false, &cancelled, |_, _| {})
        .await;

    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().filter(|r| r.source == Source::Wayback).count(),
        2
    );
    assert_eq!(
        records.iter().filter(|r| r.source == Source::VirusTotal).count(),
        1
    );
}

#[tokio::test]
async fn failing_sources_degrade_to_empty_without_error() {
    let server = MockServer::start().await;
    common::mount_error(&server, 503).await;

    let harvester = harvester_for(&server, Some("test-key"));
    let cancelled = AtomicBool::new(false);
    let records = harvester
        .harvest_all(&["example.com".to_string()], false, &cancelled, |_, _| {})
        .await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn malformed_payloads_degrade_to_empty() {
    let server = MockServer::start().await;
    common::mount_garbage(&server).await;

    let harvester = harvester_for(&server, Some("test-key"));
    let cancelled = AtomicBool::new(false);
    let records = harvester
        .harvest_all(&["example.com".to_string()], false, &cancelled, |_, _| {})
        .await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn one_failing_domain_does_not_halt_the_rest() {
    let server = MockServer::start().await;
    // Only b.com has data; a.com's fetches all miss and 404.
    common::mount_cdx(&server, "b.com", &[("20230101000000", "https://b.com/page")]).await;
    common::mount_commoncrawl(&server, INDEX, "b.com", "").await;
    common::mount_virustotal(&server, "b.com", &[]).await;
    common::mount_error(&server, 404).await;

    let harvester = harvester_for(&server, Some("test-key"));
    let cancelled = AtomicBool::new(false);
    let mut seen_domains = Vec::new();
    let records = harvester
        .harvest_all(
            &["a.com".to_string(), "b.com".to_string()],
            false,
            &cancelled,
            |domain, _| seen_domains.push(domain.to_string()),
        )
        .await;

    assert_eq!(seen_domains, vec!["a.com", "b.com"]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://b.com/page");
}

#[tokio::test]
async fn domains_merge_in_submission_order() {
    let server = MockServer::start().await;
    common::mount_cdx(&server, "a.com", &[("20230101000000", "https://a.com/1")]).await;
    common::mount_cdx(&server, "b.com", &[("20230101000000", "https://b.com/1")]).await;
    common::mount_commoncrawl(&server, INDEX, "a.com", "").await;
    common::mount_commoncrawl(&server, INDEX, "b.com", "").await;
    common::mount_virustotal(&server, "a.com", &[]).await;
    common::mount_virustotal(&server, "b.com", &[]).await;

    let harvester = harvester_for(&server, Some("test-key"));
    let cancelled = AtomicBool::new(false);
    let records = harvester
        .harvest_all(
            &["a.com".to_string(), "b.com".to_string()],
            false,
            &cancelled,
            |_, _| {},
        )
        .await;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.com/1", "https://b.com/1"]);
}

#[tokio::test]
async fn subdomain_flag_changes_the_query() {
    let server = MockServer::start().await;
    // Mounted for "*.example.com/*" only; the plain query has no match and
    // wiremock then answers 404, which the client degrades to empty.
    common::mount_cdx(&server, "*.example.com", &[("20230101000000", "https://sub.example.com/x")])
        .await;

    let client = WaybackClient::new(reqwest::Client::new(), server.uri());
    assert_eq!(client.fetch("example.com", true).await.len(), 1);
    assert!(client.fetch("example.com", false).await.is_empty());
}

#[tokio::test]
async fn cancellation_collects_no_results() {
    let server = MockServer::start().await;
    common::mount_cdx(&server, "example.com", &[("20230101000000", "https://example.com/a")])
        .await;
    common::mount_commoncrawl(&server, INDEX, "example.com", "").await;
    common::mount_virustotal(&server, "example.com", &[]).await;

    let harvester = harvester_for(&server, Some("test-key"));
    let cancelled = AtomicBool::new(true);
    let mut called = false;
    let records = harvester
        .harvest_all(&["example.com".to_string()], false, &cancelled, |_, _| {
            called = true;
        })
        .await;

    assert!(records.is_empty());
    assert!(!called);
    assert!(cancelled.load(Ordering::SeqCst));
}
