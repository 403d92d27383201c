// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Injection Spider
 * Collects fuzzable query parameters and form inputs during the crawl
 * and drains the XSS/SQLi/LFI task list through a bounded concurrent
 * pool afterwards. Form tasks honor the form's declared method.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::SpiderResult;
use crate::events::LogSeverity;
use crate::extractor;
use crate::fetcher::{FetchRequest, Fetcher};
use crate::frontier::{Spider, SpiderCx};
use crate::payloads::{self, VulnClass};
use crate::types::{Finding, FindingStatus, WorkItem};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const FUZZ_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on queued fuzz tasks for a single run
const MAX_TASKS: usize = 5000;

const FUZZED_CLASSES: [VulnClass; 3] = [VulnClass::Xss, VulnClass::Sqli, VulnClass::Lfi];

/// Database error fragments that betray an unescaped parameter
const SQL_ERROR_SIGNATURES: [&str; 8] = [
    "you have an error in your sql syntax",
    "warning: mysql",
    "unclosed quotation mark",
    "quoted string not properly terminated",
    "pg_query",
    "sqlite error",
    "ora-",
    "syntax error at or near",
];

const LFI_MARKER: &str = "root:x:0";

/// How the payload reaches the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FuzzTarget {
    /// GET with the parameter set in the query string
    Query,
    /// POST with an urlencoded body
    FormBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FuzzTask {
    url: String,
    param: String,
    class: VulnClass,
    payload: String,
    target: FuzzTarget,
}

pub struct InjectionSpider {
    fetcher: Arc<Fetcher>,
    tasks: Mutex<Vec<FuzzTask>>,
    queued_params: Mutex<HashSet<(String, String, FuzzTarget)>>,
}

impl InjectionSpider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            tasks: Mutex::new(Vec::new()),
            queued_params: Mutex::new(HashSet::new()),
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<FuzzTask>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queues the payload cross-product for one parameter, once per
    /// (url, param, target) triple and bounded by MAX_TASKS overall
    fn queue_param(&self, url: &str, param: &str, target: FuzzTarget) -> usize {
        {
            let mut queued = match self.queued_params.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !queued.insert((url.to_string(), param.to_string(), target)) {
                return 0;
            }
        }

        let mut tasks = self.lock_tasks();
        let mut added = 0;
        for class in FUZZED_CLASSES {
            for payload in payloads::payloads_for(class) {
                if tasks.len() >= MAX_TASKS {
                    return added;
                }
                tasks.push(FuzzTask {
                    url: url.to_string(),
                    param: param.to_string(),
                    class,
                    payload: payload.to_string(),
                    target,
                });
                added += 1;
            }
        }
        added
    }

    fn classify(task: &FuzzTask, status_code: u16, body: &str) -> Option<Finding> {
        let method = match task.target {
            FuzzTarget::Query => "GET",
            FuzzTarget::FormBody => "POST",
        };
        let body_lower = body.to_lowercase();
        let finding = match task.class {
            VulnClass::Sqli => {
                let signature = SQL_ERROR_SIGNATURES
                    .iter()
                    .find(|sig| body_lower.contains(*sig))?;
                Some(
                    Finding::new(
                        "SQL Injection",
                        &task.url,
                        FindingStatus::Vulnerable,
                        format!("Database error in response: \"{signature}\""),
                    )
                    .with_parameter(&task.param)
                    .with_payload(&task.payload)
                    .with_extra("statusCode", status_code.to_string()),
                )
            }
            VulnClass::Xss => {
                // Raw reflection only suggests injection; context is
                // not verified, so this stays Potential
                if !body.contains(&task.payload) {
                    return None;
                }
                Some(
                    Finding::new(
                        "Potential XSS (Reflected)",
                        &task.url,
                        FindingStatus::Potential,
                        "Payload reflected unencoded in response body",
                    )
                    .with_parameter(&task.param)
                    .with_payload(&task.payload)
                    .with_extra("statusCode", status_code.to_string()),
                )
            }
            VulnClass::Lfi => {
                if !body.contains(LFI_MARKER) {
                    return None;
                }
                Some(
                    Finding::new(
                        "Local File Inclusion",
                        &task.url,
                        FindingStatus::Vulnerable,
                        "passwd file contents in response",
                    )
                    .with_parameter(&task.param)
                    .with_payload(&task.payload)
                    .with_extra("statusCode", status_code.to_string()),
                )
            }
            VulnClass::OpenRedirect => None,
        };
        finding.map(|f| f.with_method(method))
    }

    async fn run_task(&self, task: &FuzzTask, cx: &SpiderCx) {
        let request = match task.target {
            FuzzTarget::Query => {
                let Some(test_url) =
                    payloads::inject_query(&task.url, &task.param, &task.payload)
                else {
                    return;
                };
                FetchRequest::get(test_url)
            }
            FuzzTarget::FormBody => FetchRequest::post_form(
                &task.url,
                payloads::form_body(&task.param, &task.payload),
            ),
        };
        cx.reporter.log(
            LogSeverity::Action,
            format!(
                "[FUZZ] Testing param \"{}\" with payload \"{}\" ({:?}, {})",
                task.param, task.payload, task.class, request.method
            ),
        );
        let url = request.url.clone();
        let response = match self
            .fetcher
            .fetch(request.with_timeout(FUZZ_TIMEOUT))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                cx.reporter.log(
                    LogSeverity::Error,
                    format!("[ERROR] Error testing {url}: {err}"),
                );
                return;
            }
        };
        if let Some(finding) = Self::classify(task, response.status_code, &response.body) {
            cx.reporter.report(finding);
        }
    }
}

#[async_trait]
impl Spider for InjectionSpider {
    fn name(&self) -> &'static str {
        "injection"
    }

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>> {
        let response = self.fetcher.get(&item.url).await?;
        let extraction = extractor::extract(&response.body, &item.url);

        let mut queued = 0;
        for (param, _) in extractor::params_from_url(&item.url) {
            queued += self.queue_param(&item.url, &param, FuzzTarget::Query);
        }
        // Form inputs are fuzzed per the form's declared method
        for form in &extraction.forms {
            let target = if form.method == "POST" {
                FuzzTarget::FormBody
            } else {
                FuzzTarget::Query
            };
            for input in &form.inputs {
                queued += self.queue_param(&form.action, input, target);
            }
        }
        if queued > 0 {
            cx.reporter.log(
                LogSeverity::Info,
                format!("[QUEUE] {queued} fuzz tasks from {}", item.url),
            );
        }

        Ok(extraction.links.into_iter().collect())
    }

    async fn finish(&self, cx: &SpiderCx) -> SpiderResult<()> {
        let tasks: Vec<FuzzTask> = std::mem::take(&mut *self.lock_tasks());
        if tasks.is_empty() {
            cx.reporter
                .log(LogSeverity::Info, "No fuzzable parameters found.".to_string());
            return Ok(());
        }

        cx.reporter.log(
            LogSeverity::Info,
            format!("Fuzzing {} queued tasks...", tasks.len()),
        );

        stream::iter(tasks.iter())
            .for_each_concurrent(cx.options.concurrency, |task| async move {
                if cx.cancelled() {
                    return;
                }
                self.run_task(task, cx).await;
            })
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchConfig;

    fn spider() -> InjectionSpider {
        InjectionSpider::new(Arc::new(Fetcher::new(FetchConfig::default()).unwrap()))
    }

    #[test]
    fn test_queue_param_once_per_url() {
        let s = spider();
        let first = s.queue_param("https://example.com/item?id=1", "id", FuzzTarget::Query);
        assert!(first > 0);
        assert_eq!(
            s.queue_param("https://example.com/item?id=1", "id", FuzzTarget::Query),
            0
        );
        // Same param on another URL queues again
        assert!(s.queue_param("https://example.com/other?id=2", "id", FuzzTarget::Query) > 0);
    }

    #[test]
    fn test_queue_param_distinguishes_targets() {
        let s = spider();
        assert!(s.queue_param("https://example.com/login", "next", FuzzTarget::Query) > 0);
        // The same field posted as a form body is a separate surface
        assert!(s.queue_param("https://example.com/login", "next", FuzzTarget::FormBody) > 0);
        assert_eq!(
            s.queue_param("https://example.com/login", "next", FuzzTarget::FormBody),
            0
        );
    }

    #[test]
    fn test_sqli_classification() {
        let task = FuzzTask {
            url: "https://example.com/item?id=1".to_string(),
            param: "id".to_string(),
            class: VulnClass::Sqli,
            payload: "'".to_string(),
            target: FuzzTarget::Query,
        };
        let finding = InjectionSpider::classify(
            &task,
            500,
            "You have an error in your SQL syntax near ''",
        )
        .unwrap();
        assert_eq!(finding.vuln_type, "SQL Injection");
        assert_eq!(finding.status, FindingStatus::Vulnerable);
        assert_eq!(finding.method, "GET");

        assert!(InjectionSpider::classify(&task, 200, "all good").is_none());
    }

    #[test]
    fn test_form_task_findings_carry_post_method() {
        let task = FuzzTask {
            url: "https://example.com/login".to_string(),
            param: "username".to_string(),
            class: VulnClass::Sqli,
            payload: "' OR '1'='1".to_string(),
            target: FuzzTarget::FormBody,
        };
        let finding =
            InjectionSpider::classify(&task, 500, "Warning: mysql_query()").unwrap();
        assert_eq!(finding.method, "POST");
        assert_eq!(finding.parameter.as_deref(), Some("username"));
    }

    #[test]
    fn test_xss_requires_exact_reflection() {
        let task = FuzzTask {
            url: "https://example.com/search?q=x".to_string(),
            param: "q".to_string(),
            class: VulnClass::Xss,
            payload: "<script>alert(1)</script>".to_string(),
            target: FuzzTarget::Query,
        };
        let body = "you searched for <script>alert(1)</script>";
        let finding = InjectionSpider::classify(&task, 200, body).unwrap();
        assert_eq!(finding.status, FindingStatus::Potential);

        let encoded = "you searched for &lt;script&gt;alert(1)&lt;/script&gt;";
        assert!(InjectionSpider::classify(&task, 200, encoded).is_none());
    }

    #[test]
    fn test_lfi_marker() {
        let task = FuzzTask {
            url: "https://example.com/view?file=a".to_string(),
            param: "file".to_string(),
            class: VulnClass::Lfi,
            payload: "../../../../etc/passwd".to_string(),
            target: FuzzTarget::Query,
        };
        let body = "root:x:0:0:root:/root:/bin/bash";
        assert!(InjectionSpider::classify(&task, 200, body).is_some());
    }
}
