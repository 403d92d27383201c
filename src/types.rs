// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Core Data Model
 * Work items, findings, discovered parameters and run options
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Crawl phase of a work item. Seed URLs are queued in the scope phase;
/// everything discovered while crawling is queued in the spider phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Scope,
    Spider,
}

/// A single unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub url: String,
    pub depth: u32,
    pub phase: Phase,
}

impl WorkItem {
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            phase: Phase::Scope,
        }
    }

    pub fn discovered(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
            phase: Phase::Spider,
        }
    }
}

/// Scan mode: active probes targets directly, passive only observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Active,
    Passive,
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::Active
    }
}

/// Finding status on the wire. Names match the event stream consumed by
/// the host UI, including the spaced variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingStatus {
    Vulnerable,
    Potential,
    Protected,
    Redirected,
    #[serde(rename = "Meta Refresh")]
    MetaRefresh,
    #[serde(rename = "JS Redirect")]
    JsRedirect,
    Reflected,
    Cookie,
    #[serde(rename = "Potential Takeover")]
    PotentialTakeover,
    #[serde(rename = "CNAME Found")]
    CnameFound,
    #[serde(rename = "No CNAME")]
    NoCname,
    #[serde(rename = "No Issue")]
    NoIssue,
    Detected,
    #[serde(rename = "Not Found")]
    NotFound,
    Found,
    Accessible,
    Missing,
    Enabled,
    Weak,
    Error,
}

/// A reported security finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Finding class, e.g. "Open Redirect" or "Critical Clickjacking"
    #[serde(rename = "type")]
    pub vuln_type: String,

    /// URL the finding applies to
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    pub method: String,

    pub status: FindingStatus,

    pub evidence: String,

    /// Class-specific extras (service attribution, redirect chain,
    /// protections, tags). BTreeMap keeps serialization deterministic
    /// so hashes are stable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(
        vuln_type: impl Into<String>,
        url: impl Into<String>,
        status: FindingStatus,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            vuln_type: vuln_type.into(),
            url: url.into(),
            parameter: None,
            payload: None,
            method: "GET".to_string(),
            status,
            evidence: evidence.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Stable dedup hash over the normalized finding fields
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.vuln_type.as_bytes());
        hasher.update(b"|");
        hasher.update(self.url.as_bytes());
        hasher.update(b"|");
        hasher.update(self.parameter.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(self.payload.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(self.method.as_bytes());
        hasher.update(b"|");
        hasher.update(self.evidence.as_bytes());
        for (key, value) in &self.extra {
            hasher.update(b"|");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Where a parameter was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Url,
    Form,
    Js,
    #[serde(rename = "html")]
    HtmlAttr,
    Header,
}

/// A parameter discovered while crawling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredParameter {
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_example: Option<String>,
    pub source: ParamSource,
    pub tags: BTreeSet<String>,
}

impl DiscoveredParameter {
    /// Dedup key: same parameter on the same URL from the same source
    pub fn key(&self) -> (String, String, ParamSource) {
        (self.url.clone(), self.name.clone(), self.source)
    }
}

fn default_depth() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    8
}

fn default_canary_host() -> String {
    "evil.com".to_string()
}

/// Options carried by the `start` control message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiderOptions {
    pub urls: Vec<String>,

    #[serde(default = "default_depth")]
    pub depth: u32,

    #[serde(default = "default_true")]
    pub same_domain: bool,

    #[serde(default)]
    pub scan_mode: ScanMode,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attacker-controlled marker host injected by redirect payloads
    #[serde(default = "default_canary_host")]
    pub canary_host: String,

    /// Path of the persisted findings file, when the spider keeps one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings_file: Option<String>,
}

impl Default for SpiderOptions {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            depth: default_depth(),
            same_domain: true,
            scan_mode: ScanMode::default(),
            concurrency: default_concurrency(),
            canary_host: default_canary_host(),
            findings_file: None,
        }
    }
}

impl SpiderOptions {
    pub fn with_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finding_hash_is_stable() {
        let a = Finding::new(
            "Open Redirect",
            "https://example.com/login?next=x",
            FindingStatus::Redirected,
            "Location: https://evil.com",
        )
        .with_parameter("next")
        .with_payload("https://evil.com");
        let b = a.clone();
        assert_eq!(a.hash(), b.hash());

        let c = a.clone().with_payload("//evil.com");
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn test_finding_status_wire_names() {
        let s = serde_json::to_string(&FindingStatus::PotentialTakeover).unwrap();
        assert_eq!(s, "\"Potential Takeover\"");
        let s = serde_json::to_string(&FindingStatus::MetaRefresh).unwrap();
        assert_eq!(s, "\"Meta Refresh\"");
    }

    #[test]
    fn test_options_defaults_from_sparse_json() {
        let opts: SpiderOptions =
            serde_json::from_str(r#"{"urls":["https://example.com"]}"#).unwrap();
        assert_eq!(opts.depth, 3);
        assert!(opts.same_domain);
        assert_eq!(opts.scan_mode, ScanMode::Active);
        assert_eq!(opts.concurrency, 8);
        assert_eq!(opts.canary_host, "evil.com");
    }

    #[test]
    fn test_finding_serializes_type_key() {
        let f = Finding::new(
            "WordPress",
            "https://blog.example.com",
            FindingStatus::Detected,
            "Detected via /wp-login.php",
        );
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["type"], "WordPress");
        assert!(json.get("parameter").is_none());
    }
}
