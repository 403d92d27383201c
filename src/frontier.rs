// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Crawl Frontier
 * Breadth-first scheduler driving a spider over its scope. All state is
 * owned by a single run; nothing leaks into the next one.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::SpiderResult;
use crate::events::LogSeverity;
use crate::reporter::Reporter;
use crate::throttle::AdaptiveThrottle;
use crate::types::{SpiderOptions, WorkItem};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Shared context handed to a spider for the duration of one run
#[derive(Clone)]
pub struct SpiderCx {
    pub reporter: Arc<Reporter>,
    pub cancel: CancellationToken,
    pub options: SpiderOptions,
}

impl SpiderCx {
    pub fn new(reporter: Arc<Reporter>, cancel: CancellationToken, options: SpiderOptions) -> Self {
        Self {
            reporter,
            cancel,
            options,
        }
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A spider variant plugged into the frontier. `process` handles one
/// dequeued URL and returns follow-up links; `finish` runs exactly once
/// after the crawl loop, on both the drained and the cancelled path.
#[async_trait]
pub trait Spider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>>;

    async fn finish(&self, _cx: &SpiderCx) -> SpiderResult<()> {
        Ok(())
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierOutcome {
    Drained,
    Cancelled,
}

fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

fn host_path_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => format!(
            "{}{}",
            u.host_str().unwrap_or_default().to_lowercase(),
            u.path()
        ),
        Err(_) => url.to_string(),
    }
}

/// Drive one spider run to completion
pub async fn run(spider: &dyn Spider, cx: &SpiderCx) -> SpiderResult<FrontierOutcome> {
    let options = &cx.options;
    let reporter = &cx.reporter;

    let mut queue: VecDeque<WorkItem> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    // Suppresses re-crawling the same host+path under differing queries
    let mut host_paths: HashSet<String> = HashSet::new();
    let mut throttle = AdaptiveThrottle::default();

    let scope_hosts: HashSet<String> = options.urls.iter().filter_map(|u| hostname(u)).collect();

    for url in &options.urls {
        queue.push_back(WorkItem::seed(url.clone()));
    }

    reporter.log(
        LogSeverity::Info,
        format!("Scope: {} URLs. Starting spider...", options.urls.len()),
    );

    let outcome = loop {
        if cx.cancelled() {
            break FrontierOutcome::Cancelled;
        }
        let Some(item) = queue.pop_front() else {
            break FrontierOutcome::Drained;
        };
        // Visited is checked at dequeue so late duplicates in the queue
        // cost nothing
        if !visited.insert(item.url.clone()) {
            continue;
        }

        reporter.progress();
        reporter.log(
            LogSeverity::Info,
            format!(
                "[SPIDER] ({:?}) Fetching: {} (depth={})",
                item.phase, item.url, item.depth
            ),
        );

        match spider.process(&item, cx).await {
            Ok(links) => {
                if let Some(delay) = throttle.record_success() {
                    reporter.log(
                        LogSeverity::Info,
                        format!("[THROTTLE] Decreased delay to {}ms (healthy)", delay.as_millis()),
                    );
                }

                if item.depth < options.depth && !links.is_empty() {
                    reporter.log(
                        LogSeverity::Info,
                        format!("[DISCOVER] Found {} links on {}", links.len(), item.url),
                    );
                    for link in links {
                        if visited.contains(&link) {
                            continue;
                        }
                        if options.same_domain {
                            match hostname(&link) {
                                Some(host) if scope_hosts.contains(&host) => {}
                                _ => continue,
                            }
                        }
                        if !host_paths.insert(host_path_key(&link)) {
                            continue;
                        }
                        queue.push_back(WorkItem::discovered(link, item.depth + 1));
                    }
                }
            }
            Err(err) => {
                reporter.log(
                    LogSeverity::Error,
                    format!(
                        "[ERROR] Failed to process {}: {} (errorCount={})",
                        item.url,
                        err,
                        throttle.error_streak() + 1
                    ),
                );
                if let Some(delay) = throttle.record_failure() {
                    reporter.log(
                        LogSeverity::Warn,
                        format!(
                            "[THROTTLE] Increased delay to {}ms due to repeated errors.",
                            delay.as_millis()
                        ),
                    );
                }
            }
        }

        throttle.pause().await;
    };

    debug!(
        spider = spider.name(),
        outcome = ?outcome,
        visited = visited.len(),
        "Crawl loop finished"
    );

    spider.finish(cx).await?;
    Ok(outcome)
}
