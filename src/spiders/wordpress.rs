// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - WordPress Recon Spider
 * Detection probes, version fingerprinting, plugin/theme enumeration
 * with optional vulnerability database lookups, sensitive file and
 * directory-indexing checks. Works on seed URLs only; discovery happens
 * through probes, not crawling.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::{SpiderError, SpiderResult};
use crate::events::LogSeverity;
use crate::fetcher::Fetcher;
use crate::frontier::{Spider, SpiderCx};
use crate::types::{Finding, FindingStatus, Phase, WorkItem};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

const COMMON_PATHS: [&str; 14] = [
    "/wp-login.php",
    "/wp-admin/",
    "/wp-content/",
    "/readme.html",
    "/wp-config.php.bak",
    "/debug.log",
    "/.git/",
    "/.svn/",
    "/wp-content/backups/",
    "/wp-content/uploads/",
    "/wp-content/logs/",
    "/wp-content/old/",
    "/robots.txt",
    "/sitemap.xml",
];

const SENSITIVE_FILES: [&str; 16] = [
    "/wp-config.php.bak",
    "/debug.log",
    "/.git/",
    "/.svn/",
    "/wp-content/backups/",
    "/wp-content/uploads/",
    "/wp-content/logs/",
    "/wp-content/old/",
    "/.env",
    "/.htaccess",
    "/.htpasswd",
    "/db.sql",
    "/backup.zip",
    "/backup.tar.gz",
    "/dump.sql",
    "/db_backup.sql",
];

const DIRS_TO_CHECK: [&str; 5] = [
    "/wp-content/",
    "/wp-content/plugins/",
    "/wp-content/themes/",
    "/wp-content/uploads/",
    "/wp-content/backups/",
];

const WP_MARKERS: [&str; 4] = ["wp-content", "wp-includes", "WordPress", "wp-admin"];

static GENERATOR_META_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta name="generator" content="WordPress\s*([0-9.]+)""#).unwrap()
});

static VER_ASSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]ver=([0-9.]+)").unwrap());

static DIR_LISTING_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="([a-zA-Z0-9_\-]+)/""#).unwrap());

static STABLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Stable tag:\s*([0-9.]+)").unwrap());

static STYLE_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Version:\s*([0-9.]+)").unwrap());

static INDEX_OF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Index of").unwrap());

static CONTENT_SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/wp-content/(plugins|themes)/([a-zA-Z0-9_\-]+)/").unwrap()
});

#[derive(Debug, Clone, Deserialize)]
pub struct VulnAdvisory {
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Known vulnerable plugin/theme versions, keyed by slug then version
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VulnDb {
    #[serde(default)]
    pub plugins: HashMap<String, HashMap<String, VulnAdvisory>>,
    #[serde(default)]
    pub themes: HashMap<String, HashMap<String, VulnAdvisory>>,
}

impl VulnDb {
    pub fn load(path: impl AsRef<Path>) -> SpiderResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SpiderError::Store(format!("read vuln db: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| SpiderError::Store(format!("parse vuln db: {e}")))
    }
}

pub struct WordPressSpider {
    fetcher: Arc<Fetcher>,
    vuln_db: VulnDb,
}

impl WordPressSpider {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            vuln_db: VulnDb::default(),
        }
    }

    pub fn with_vuln_db(mut self, vuln_db: VulnDb) -> Self {
        self.vuln_db = vuln_db;
        self
    }

    fn base_of(url: &str) -> String {
        url.trim_end_matches('/').to_string()
    }

    fn body_has_markers(body: &str) -> bool {
        WP_MARKERS.iter().any(|m| body.contains(m))
    }

    async fn detect(&self, base: &str, cx: &SpiderCx) -> SpiderResult<Option<String>> {
        cx.reporter.log(
            LogSeverity::Info,
            format!("Checking if {base} is a WordPress site..."),
        );

        let home = self.fetcher.get(&format!("{base}/")).await?;
        let mut detected = Self::body_has_markers(&home.body) && home.status_code == 200;
        if detected {
            cx.reporter.report(Finding::new(
                "WordPress",
                base,
                FindingStatus::Detected,
                "Detected via homepage markers",
            ));
        }

        if !detected {
            for path in COMMON_PATHS {
                if cx.cancelled() {
                    return Ok(None);
                }
                let url = format!("{base}{path}");
                cx.reporter.log(LogSeverity::Info, format!("Probing {url}"));
                let Ok(probe) = self.fetcher.get(&url).await else {
                    continue;
                };
                if probe.status_code == 200 && Self::body_has_markers(&probe.body) {
                    detected = true;
                    cx.reporter.report(Finding::new(
                        "WordPress",
                        base,
                        FindingStatus::Detected,
                        format!("Detected via {path}"),
                    ));
                    break;
                }
            }
        }

        if !detected {
            cx.reporter.log(
                LogSeverity::Info,
                format!("{base} does not look like WordPress."),
            );
            return Ok(None);
        }

        // Version: generator meta first, ?ver= assets as fallback
        let version = GENERATOR_META_RE
            .captures(&home.body)
            .or_else(|| VER_ASSET_RE.captures(&home.body))
            .map(|caps| caps[1].to_string());
        if let Some(version) = &version {
            cx.reporter.report(
                Finding::new(
                    "WordPress Version",
                    base,
                    FindingStatus::Found,
                    format!("WordPress {version}"),
                )
                .with_extra("version", version.clone()),
            );
        }
        cx.reporter.log(
            LogSeverity::Info,
            format!(
                "WordPress detected on {base}{}",
                version.map(|v| format!(" (v{v})")).unwrap_or_default()
            ),
        );

        // Passive slugs from the homepage markup
        for caps in CONTENT_SLUG_RE.captures_iter(&home.body) {
            let kind = if &caps[1] == "plugins" { "Plugin" } else { "Theme" };
            cx.reporter.report(Finding::new(
                kind,
                base,
                FindingStatus::Found,
                format!("Referenced in homepage markup: {}", &caps[2]),
            ));
        }

        Ok(Some(home.body))
    }

    async fn enumerate_plugins(&self, base: &str, cx: &SpiderCx) {
        cx.reporter
            .log(LogSeverity::Info, "Enumerating plugins...".to_string());
        let listing_url = format!("{base}/wp-content/plugins/");
        let Ok(listing) = self.fetcher.get(&listing_url).await else {
            return;
        };
        if listing.status_code != 200 {
            return;
        }

        let slugs: BTreeSet<String> = DIR_LISTING_ENTRY_RE
            .captures_iter(&listing.body)
            .map(|caps| caps[1].to_string())
            .collect();

        for slug in slugs {
            if cx.cancelled() {
                break;
            }
            let mut version = None;
            if let Ok(readme) = self
                .fetcher
                .get(&format!("{listing_url}{slug}/readme.txt"))
                .await
            {
                version = STABLE_TAG_RE
                    .captures(&readme.body)
                    .map(|caps| caps[1].to_string());
            }

            let detail = match &version {
                Some(v) => format!("{slug} (v{v})"),
                None => slug.clone(),
            };
            cx.reporter.report(
                Finding::new("Plugin", base, FindingStatus::Found, detail)
                    .with_extra("url", format!("{listing_url}{slug}/")),
            );

            if let Some(version) = &version {
                if let Some(advisory) = self
                    .vuln_db
                    .plugins
                    .get(&slug)
                    .and_then(|versions| versions.get(version))
                {
                    cx.reporter.report(
                        Finding::new(
                            "Plugin Vulnerability",
                            base,
                            FindingStatus::Vulnerable,
                            format!("{slug} v{version}: {}", advisory.title),
                        )
                        .with_extra("advisory", advisory.url.clone()),
                    );
                }
            }
        }
    }

    async fn enumerate_themes(&self, base: &str, cx: &SpiderCx) {
        cx.reporter
            .log(LogSeverity::Info, "Enumerating themes...".to_string());
        let listing_url = format!("{base}/wp-content/themes/");
        let Ok(listing) = self.fetcher.get(&listing_url).await else {
            return;
        };
        if listing.status_code != 200 {
            return;
        }

        let slugs: BTreeSet<String> = DIR_LISTING_ENTRY_RE
            .captures_iter(&listing.body)
            .map(|caps| caps[1].to_string())
            .collect();

        for slug in slugs {
            if cx.cancelled() {
                break;
            }
            let mut version = None;
            if let Ok(style) = self
                .fetcher
                .get(&format!("{listing_url}{slug}/style.css"))
                .await
            {
                version = STYLE_VERSION_RE
                    .captures(&style.body)
                    .map(|caps| caps[1].to_string());
            }

            let detail = match &version {
                Some(v) => format!("{slug} (v{v})"),
                None => slug.clone(),
            };
            cx.reporter.report(
                Finding::new("Theme", base, FindingStatus::Found, detail)
                    .with_extra("url", format!("{listing_url}{slug}/")),
            );

            if let Some(version) = &version {
                if let Some(advisory) = self
                    .vuln_db
                    .themes
                    .get(&slug)
                    .and_then(|versions| versions.get(version))
                {
                    cx.reporter.report(
                        Finding::new(
                            "Theme Vulnerability",
                            base,
                            FindingStatus::Vulnerable,
                            format!("{slug} v{version}: {}", advisory.title),
                        )
                        .with_extra("advisory", advisory.url.clone()),
                    );
                }
            }
        }
    }

    async fn check_sensitive_paths(&self, base: &str, cx: &SpiderCx) {
        cx.reporter.log(
            LogSeverity::Info,
            "Checking for sensitive files and backups...".to_string(),
        );
        for path in SENSITIVE_FILES {
            if cx.cancelled() {
                break;
            }
            let url = format!("{base}{path}");
            let Ok(probe) = self.fetcher.get(&url).await else {
                continue;
            };
            if probe.status_code == 200 && !probe.body.is_empty() {
                cx.reporter.report(
                    Finding::new("Sensitive File", base, FindingStatus::Accessible, url)
                        .with_extra("path", path),
                );
            }
        }
    }

    async fn check_directory_indexing(&self, base: &str, cx: &SpiderCx) {
        cx.reporter.log(
            LogSeverity::Info,
            "Checking for directory indexing...".to_string(),
        );
        for dir in DIRS_TO_CHECK {
            if cx.cancelled() {
                break;
            }
            let url = format!("{base}{dir}");
            let Ok(probe) = self.fetcher.get(&url).await else {
                continue;
            };
            if probe.status_code == 200 && INDEX_OF_RE.is_match(&probe.body) {
                cx.reporter.report(
                    Finding::new("Directory Indexing", base, FindingStatus::Enabled, url)
                        .with_extra("path", dir),
                );
            }
        }
    }
}

#[async_trait]
impl Spider for WordPressSpider {
    fn name(&self) -> &'static str {
        "wordpress-recon"
    }

    async fn process(&self, item: &WorkItem, cx: &SpiderCx) -> SpiderResult<Vec<String>> {
        // Recon runs against seeds only
        if item.phase != Phase::Scope {
            return Ok(Vec::new());
        }

        let base = Self::base_of(&item.url);
        let Some(_home_body) = self.detect(&base, cx).await? else {
            return Ok(Vec::new());
        };

        self.enumerate_plugins(&base, cx).await;
        self.enumerate_themes(&base, cx).await;
        self.check_sensitive_paths(&base, cx).await;
        self.check_directory_indexing(&base, cx).await;

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_regexes() {
        let body = r#"<meta name="generator" content="WordPress 6.4.2" />"#;
        assert_eq!(&GENERATOR_META_RE.captures(body).unwrap()[1], "6.4.2");

        let body = r#"<script src="/wp-includes/js/jquery.js?ver=3.7.1"></script>"#;
        assert_eq!(&VER_ASSET_RE.captures(body).unwrap()[1], "3.7.1");
    }

    #[test]
    fn test_directory_listing_slugs() {
        let body = r#"<h1>Index of /wp-content/plugins/</h1>
            <a href="../">Parent</a>
            <a href="akismet/">akismet/</a>
            <a href="contact-form-7/">contact-form-7/</a>"#;
        let slugs: Vec<String> = DIR_LISTING_ENTRY_RE
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect();
        assert_eq!(slugs, vec!["akismet", "contact-form-7"]);
    }

    #[test]
    fn test_vuln_db_parses() {
        let json = r#"{
            "plugins": {
                "revslider": {
                    "4.1.4": { "title": "Arbitrary file download", "url": "https://example.com/adv" }
                }
            }
        }"#;
        let db: VulnDb = serde_json::from_str(json).unwrap();
        let advisory = db.plugins["revslider"]["4.1.4"].clone();
        assert_eq!(advisory.title, "Arbitrary file download");
        assert!(db.themes.is_empty());
    }

    #[test]
    fn test_marker_detection() {
        assert!(WordPressSpider::body_has_markers(
            "<link href='/wp-content/themes/x/style.css'>"
        ));
        assert!(!WordPressSpider::body_has_markers("<html>plain site</html>"));
    }
}
