// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Open Redirect Spider
 * Crawls in scope, fuzzes redirect-looking query parameters and form
 * fields against the canary host, and reports every signature subtype
 * that matches.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::SpiderResult;
use crate::events::LogSeverity;
use crate::extractor::{self, is_likely_redirect_param};
use crate::fetcher::{FetchRequest, Fetcher};
use crate::frontier::{Spider, SpiderCx};
use crate::payloads::{self, open_redirect_payloads};
use crate::signatures::{classify_open_redirect, RedirectContext};
use crate::types::WorkItem;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Per-payload request timeout; shorter than the crawl fetch so a slow
/// target cannot starve the fuzz loop
const FUZZ_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenRedirectSpider {
    fetcher: Arc<Fetcher>,
    payloads: Vec<String>,
}

impl OpenRedirectSpider {
    pub fn new(fetcher: Arc<Fetcher>, canary_host: &str) -> Self {
        Self {
            fetcher,
            payloads: open_redirect_payloads(canary_host),
        }
    }

    async fn fuzz_query(&self, item: &WorkItem, cx: &SpiderCx) {
        for (param, _) in extractor::params_from_url(&item.url) {
            if !is_likely_redirect_param(&param) {
                continue;
            }
            for payload in &self.payloads {
                if cx.cancelled() {
                    return;
                }
                let Some(test_url) = payloads::inject_query(&item.url, &param, payload) else {
                    continue;
                };
                cx.reporter.log(
                    LogSeverity::Action,
                    format!("[FUZZ] Testing param \"{param}\" with payload \"{payload}\" (GET)"),
                );
                let response = match self
                    .fetcher
                    .fetch(FetchRequest::get(&test_url).with_timeout(FUZZ_TIMEOUT))
                    .await
                {
                    Ok(response) => response,
                    Err(err) => {
                        cx.reporter.log(
                            LogSeverity::Error,
                            format!("[ERROR] Error testing {test_url}: {err}"),
                        );
                        continue;
                    }
                };
                let findings = classify_open_redirect(&RedirectContext {
                    original_url: &item.url,
                    tested_url: &test_url,
                    parameter: &param,
                    payload,
                    method: "GET",
                    request_type: "query",
                    canary_host: &cx.options.canary_host,
                    response: &response,
                });
                for finding in findings {
                    cx.reporter.report(finding);
                }
            }
        }
    }

    async fn fuzz_forms(&self, item: &WorkItem, extraction: &extractor::Extraction, cx: &SpiderCx) {
        for form in &extraction.forms {
            let redirect_inputs: Vec<&String> = form
                .inputs
                .iter()
                .filter(|name| is_likely_redirect_param(name))
                .collect();
            for param in redirect_inputs {
                for payload in &self.payloads {
                    if cx.cancelled() {
                        return;
                    }
                    let post_body = payloads::form_body(param, payload);
                    cx.reporter.log(
                        LogSeverity::Action,
                        format!(
                            "[FUZZ] Testing form param \"{param}\" with payload \"{payload}\" (POST to {})",
                            form.action
                        ),
                    );
                    let response = match self
                        .fetcher
                        .fetch(
                            FetchRequest::post_form(&form.action, post_body)
                                .with_timeout(FUZZ_TIMEOUT),
                        )
                        .await
                    {
                        Ok(response) => response,
                        Err(err) => {
                            cx.reporter.log(
                                LogSeverity::Error,
                                format!("[ERROR] Error testing POST {}: {err}", form.action),
                            );
                            continue;
                        }
                    };
                    let findings = classify_open_redirect(&RedirectContext {
                        original_url: &item.url,
                        tested_url: &form.action,
                        parameter: param,
                        payload,
                        method: "POST",
                        request_type: "form",
                        canary_host: &cx.options.canary_host,
                        response: &response,
                    });
                    for finding in findings {
                        cx.reporter.report(finding);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Spider for OpenRedirectSpider {
    fn name(&self) -> &'static str {
        "open-redirect"
    }

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>> {
        let response = self.fetcher.get(&item.url).await?;
        let extraction = extractor::extract(&response.body, &item.url);

        self.fuzz_query(item, cx).await;
        self.fuzz_forms(item, &extraction, cx).await;

        Ok(extraction.links.into_iter().collect())
    }
}
