// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - ParamHunter Spider
 * Crawls in scope and reports every distinct parameter it can see in
 * URLs, forms, inline scripts and markup attributes, tagged with the
 * vulnerability classes the name suggests.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::SpiderResult;
use crate::events::LogSeverity;
use crate::extractor;
use crate::fetcher::Fetcher;
use crate::frontier::{Spider, SpiderCx};
use crate::types::{DiscoveredParameter, Finding, FindingStatus, ParamSource, WorkItem};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub struct ParamHunterSpider {
    fetcher: Arc<Fetcher>,
    seen: Mutex<HashSet<(String, String, ParamSource)>>,
}

impl ParamHunterSpider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            seen: Mutex::new(HashSet::new()),
        }
    }

    fn report_param(&self, param: &DiscoveredParameter, cx: &SpiderCx) {
        {
            let mut seen = match self.seen.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !seen.insert(param.key()) {
                return;
            }
        }

        let tags: Vec<&str> = param.tags.iter().map(String::as_str).collect();
        let source = match param.source {
            ParamSource::Url => "url",
            ParamSource::Form => "form",
            ParamSource::Js => "js",
            ParamSource::HtmlAttr => "html",
            ParamSource::Header => "header",
        };
        let mut finding = Finding::new(
            "Parameter",
            &param.url,
            FindingStatus::Found,
            format!("{} ({source})", param.name),
        )
        .with_parameter(&param.name)
        .with_extra("source", source)
        .with_extra("tags", tags.join(", "));
        if let Some(value) = &param.value_example {
            finding = finding.with_extra("valueExample", value);
        }
        cx.reporter.report(finding);
    }
}

#[async_trait]
impl Spider for ParamHunterSpider {
    fn name(&self) -> &'static str {
        "param-hunter"
    }

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>> {
        let response = self.fetcher.get(&item.url).await?;
        let extraction = extractor::extract(&response.body, &item.url);

        let mut count = 0usize;
        for param in &extraction.params {
            self.report_param(param, cx);
            count += 1;
        }
        if count > 0 {
            cx.reporter.log(
                LogSeverity::Info,
                format!("[PARAMS] {count} parameters on {}", item.url),
            );
        }

        Ok(extraction.links.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChannelSink;
    use crate::fetcher::FetchConfig;
    use crate::reporter::Reporter;
    use crate::types::SpiderOptions;
    use std::collections::BTreeSet;
    use tokio_util::sync::CancellationToken;

    fn param(url: &str, name: &str, source: ParamSource) -> DiscoveredParameter {
        DiscoveredParameter {
            url: url.to_string(),
            name: name.to_string(),
            value_example: None,
            source,
            tags: BTreeSet::from(["Other".to_string()]),
        }
    }

    #[test]
    fn test_same_param_reported_once_per_url_and_source() {
        let fetcher = Arc::new(Fetcher::new(FetchConfig::default()).unwrap());
        let spider = ParamHunterSpider::new(fetcher);
        let (sink, _rx) = ChannelSink::new();
        let reporter = Arc::new(Reporter::new(Arc::new(sink)));
        let cx = SpiderCx::new(
            reporter.clone(),
            CancellationToken::new(),
            SpiderOptions::default(),
        );

        let p = param("https://example.com/search", "q", ParamSource::Url);
        spider.report_param(&p, &cx);
        spider.report_param(&p, &cx);
        assert_eq!(reporter.found_count(), 1);

        // Same name from a different source is a distinct discovery
        let p2 = param("https://example.com/search", "q", ParamSource::Form);
        spider.report_param(&p2, &cx);
        assert_eq!(reporter.found_count(), 2);
    }
}
