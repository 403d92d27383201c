// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Subdomain Takeover Tests
 * Crawl-time harvesting plus verification against mocked DNS and a
 * claimable-service response body
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use seitti::dns::{mock::MockDns, DnsRecords};
use seitti::events::{ChannelSink, Event};
use seitti::fetcher::{FetchConfig, Fetcher};
use seitti::frontier::{self, SpiderCx};
use seitti::reporter::Reporter;
use seitti::signatures::classify_takeover;
use seitti::spiders::TakeoverSpider;
use seitti::types::{Finding, FindingStatus, ScanMode, SpiderOptions};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn github_pages_records() -> DnsRecords {
    DnsRecords {
        a: vec!["185.199.108.153".to_string()],
        cname: vec!["ghs.github.io.".to_string()],
        ns: Vec::new(),
        dnssec: false,
        nxdomain: false,
    }
}

#[tokio::test]
async fn test_dangling_github_pages_is_flagged() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html>There isn't a GitHub Pages site here.</html>"),
        )
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
    let probe = fetcher.get(&mock_server.uri()).await.unwrap();

    let finding = classify_takeover(
        "old.example.com",
        &github_pages_records(),
        Some(&probe),
        ScanMode::Active,
    );
    assert_eq!(finding.status, FindingStatus::PotentialTakeover);
    assert_eq!(finding.extra.get("service").map(String::as_str), Some("GitHub Pages"));
    assert!(finding.evidence.contains("GitHub Pages"));
}

#[test]
fn test_passive_mode_reports_cname_without_probing() {
    let finding = classify_takeover(
        "old.example.com",
        &github_pages_records(),
        None,
        ScanMode::Passive,
    );
    assert_eq!(finding.status, FindingStatus::CnameFound);
    assert!(finding.evidence.contains("ghs.github.io"));
}

#[tokio::test]
async fn test_crawl_harvests_and_verifies_subdomains() {
    let mock_server = MockServer::start().await;
    // The crawled page mentions a subdomain of the scope root
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body>Assets on cdn.example.com today</body></html>".as_bytes().to_vec(),
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let (sink, mut rx) = ChannelSink::new();
    let reporter = Arc::new(Reporter::new(Arc::new(sink)));
    // Passive mode so verification never opens a connection
    let mut options = SpiderOptions::with_urls(vec![format!("{}/", mock_server.uri())]);
    options.scan_mode = ScanMode::Passive;

    let fetcher = Arc::new(Fetcher::new(FetchConfig::default()).unwrap());
    let dns = Arc::new(MockDns::default().with("cdn.example.com", github_pages_records()));
    // Scope the spider to example.com so the page-body mention is in range
    let spider = TakeoverSpider::new(
        fetcher,
        dns,
        &["https://www.example.com/".to_string()],
    );
    let cx = SpiderCx::new(Arc::clone(&reporter), CancellationToken::new(), options);

    frontier::run(&spider, &cx).await.unwrap();

    let mut findings: Vec<Finding> = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::Finding(finding) = event {
            findings.push(finding);
        }
    }
    let takeover: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.vuln_type == "Subdomain Takeover")
        .collect();
    assert_eq!(takeover.len(), 1);
    assert_eq!(takeover[0].url, "cdn.example.com");
    assert_eq!(takeover[0].status, FindingStatus::CnameFound);
}
