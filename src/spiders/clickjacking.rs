// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Clickjacking Spider
 * Probes every page in every iframe sandbox mode when a browser session
 * is attached; falls back to header/body classification otherwise.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::browser::{probe_frame, BrowserSession, IFRAME_MODES};
use crate::errors::SpiderResult;
use crate::events::LogSeverity;
use crate::extractor;
use crate::fetcher::Fetcher;
use crate::frontier::{Spider, SpiderCx};
use crate::signatures::{classify_frame_headers, classify_frame_probe};
use crate::types::WorkItem;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ClickjackingSpider {
    fetcher: Arc<Fetcher>,
    browser: Option<Arc<dyn BrowserSession>>,
}

impl ClickjackingSpider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            browser: None,
        }
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserSession>) -> Self {
        self.browser = Some(browser);
        self
    }
}

#[async_trait]
impl Spider for ClickjackingSpider {
    fn name(&self) -> &'static str {
        "clickjacking"
    }

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>> {
        let response = self.fetcher.get(&item.url).await?;

        if let Some(browser) = &self.browser {
            for mode in IFRAME_MODES {
                if cx.cancelled() {
                    break;
                }
                cx.reporter.log(
                    LogSeverity::Action,
                    format!("[IFRAME] Testing {} with mode \"{}\"", item.url, mode.name),
                );
                let mut probe =
                    probe_frame(browser.as_ref(), &item.url, mode, PROBE_TIMEOUT).await;
                // The fetcher already saw the page's headers; reuse them
                // when the driver cannot observe frame responses
                if probe.headers.is_empty() {
                    probe.headers = response.headers.clone();
                }
                cx.reporter
                    .report(classify_frame_probe(&item.url, mode.name, &probe));
            }
        } else if let Some(finding) =
            classify_frame_headers(&item.url, response.status_code, &response.headers, &response.body)
        {
            cx.reporter.report(finding);
        }

        let links = extractor::extract(&response.body, &item.url)
            .links
            .into_iter()
            .collect();
        Ok(links)
    }

    async fn finish(&self, cx: &SpiderCx) -> SpiderResult<()> {
        if let Some(browser) = &self.browser {
            if let Err(err) = browser.close().await {
                cx.reporter
                    .log(LogSeverity::Warn, format!("Browser close failed: {err}"));
            }
        }
        Ok(())
    }
}
