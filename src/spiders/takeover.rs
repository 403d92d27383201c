// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Subdomain Takeover Spider
 * Harvests in-scope subdomains while crawling (page bodies, headers,
 * scripts, robots.txt/sitemap.xml in active mode), runs page-level
 * CORS/CSRF/security-header analysis, then verifies every unique
 * subdomain with a bounded concurrent DNS + HTTP pool.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::dns::DnsLookup;
use crate::errors::SpiderResult;
use crate::events::LogSeverity;
use crate::extractor::{self, extract_subdomains};
use crate::fetcher::Fetcher;
use crate::frontier::{Spider, SpiderCx};
use crate::signatures::{
    analyze_cors, analyze_csrf, classify_takeover, missing_security_headers,
};
use crate::types::{Finding, FindingStatus, Phase, ScanMode, WorkItem};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use url::Url;

/// Verification pool width for the post-crawl phase
const VERIFY_CONCURRENCY: usize = 50;

/// Well-known files that routinely leak internal hostnames
const DISCOVERY_PATHS: [&str; 2] = ["/robots.txt", "/sitemap.xml"];

pub struct TakeoverSpider {
    fetcher: Arc<Fetcher>,
    dns: Arc<dyn DnsLookup>,
    root_domains: Vec<String>,
    subdomains: Mutex<BTreeSet<String>>,
}

impl TakeoverSpider {
    pub fn new(fetcher: Arc<Fetcher>, dns: Arc<dyn DnsLookup>, scope_urls: &[String]) -> Self {
        let mut root_domains = Vec::new();
        for url in scope_urls {
            if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
                let host = host.to_lowercase();
                let root = host.strip_prefix("www.").unwrap_or(&host).to_string();
                if !root_domains.contains(&root) {
                    root_domains.push(root);
                }
            }
        }
        Self {
            fetcher,
            dns,
            root_domains,
            subdomains: Mutex::new(BTreeSet::new()),
        }
    }

    fn collect(&self, text: &str) -> usize {
        let found = extract_subdomains(text, &self.root_domains);
        let mut subdomains = match self.subdomains.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = subdomains.len();
        subdomains.extend(found);
        subdomains.len() - before
    }

    fn collected(&self) -> Vec<String> {
        match self.subdomains.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl Spider for TakeoverSpider {
    fn name(&self) -> &'static str {
        "subdomain-takeover"
    }

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>> {
        let response = self.fetcher.get(&item.url).await?;

        for finding in analyze_cors(&item.url, &response.headers) {
            cx.reporter.report(finding);
        }
        for finding in analyze_csrf(&item.url, &response.body) {
            cx.reporter.report(finding);
        }
        let missing = missing_security_headers(&response.headers);
        if !missing.is_empty() {
            cx.reporter.report(
                Finding::new(
                    "Security Headers",
                    &item.url,
                    FindingStatus::Missing,
                    format!("Missing: {}", missing.join(", ")),
                )
                .with_extra("missingHeaders", missing.join(", ")),
            );
        }

        let mut harvest_text = response.body.clone();
        for value in response.headers.values() {
            harvest_text.push('\n');
            harvest_text.push_str(value);
        }
        let new = self.collect(&harvest_text);
        if new > 0 {
            cx.reporter.log(
                LogSeverity::Info,
                format!("[DISCOVER] {new} new subdomains from {}", item.url),
            );
        }

        // Seeds also get their discovery files probed in active mode
        if cx.options.scan_mode == ScanMode::Active && item.phase == Phase::Scope {
            if let Ok(base) = Url::parse(&item.url) {
                for path in DISCOVERY_PATHS {
                    if cx.cancelled() {
                        break;
                    }
                    if let Ok(probe_url) = base.join(path) {
                        if let Ok(probe) = self.fetcher.get(probe_url.as_str()).await {
                            self.collect(&probe.body);
                        }
                    }
                }
            }
        }

        let links = extractor::extract(&response.body, &item.url)
            .links
            .into_iter()
            .collect();
        Ok(links)
    }

    async fn finish(&self, cx: &SpiderCx) -> SpiderResult<()> {
        let subdomains = self.collected();
        if subdomains.is_empty() {
            cx.reporter
                .log(LogSeverity::Info, "No subdomains collected.".to_string());
            return Ok(());
        }

        cx.reporter.log(
            LogSeverity::Info,
            format!("Verifying {} unique subdomains...", subdomains.len()),
        );

        let mode = cx.options.scan_mode;
        stream::iter(subdomains)
            .for_each_concurrent(VERIFY_CONCURRENCY, |subdomain| async move {
                if cx.cancelled() {
                    return;
                }
                let records = self.dns.resolve(&subdomain).await;
                let probe = if mode == ScanMode::Active && records.resolves() {
                    self.fetcher.get(&format!("https://{subdomain}/")).await.ok()
                } else {
                    None
                };
                let finding = classify_takeover(&subdomain, &records, probe.as_ref(), mode);
                if finding.status != FindingStatus::NoIssue {
                    cx.reporter.report(finding);
                } else {
                    cx.reporter.log(
                        LogSeverity::Debug,
                        format!("{subdomain}: no takeover indicators"),
                    );
                }
            })
            .await;

        Ok(())
    }
}
