// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Link and Parameter Extraction
 * Tolerant HTML/JS extraction feeding the crawl frontier and the
 * parameter hunter. Malformed markup never fails; it just yields less.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::types::{DiscoveredParameter, ParamSource};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Everything harvested from one page
#[derive(Debug, Default, Clone)]
pub struct Extraction {
    pub links: BTreeSet<String>,
    pub params: Vec<DiscoveredParameter>,
    /// (action URL, input names) per form, for POST fuzzing
    pub forms: Vec<FormInfo>,
}

#[derive(Debug, Clone)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub inputs: Vec<String>,
}

static JS_LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)location\.(?:href|replace|assign)\s*=\s*['"]([^'"]+)['"]"#).unwrap()
});

static META_REFRESH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)url\s*=\s*([^;'\x22]+)").unwrap());

static JS_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]([a-zA-Z0-9_\-\[\]]+)=").unwrap());

static HOSTNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z0-9_-]+\.)+[a-zA-Z]{2,}").unwrap());

/// Parameter-name patterns mapped to the vulnerability classes they hint
/// at. Every matching pattern contributes its tags; the final catch-all
/// keeps recall high at the cost of precision.
static PARAM_PATTERNS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    let table: &[(&str, &[&str])] = &[
        (
            "(q|query|search|s|keyword|searchtext|term|k|searchquery|search_query|search-query|keywords)",
            &["XSS"],
        ),
        ("(callback|cb|jsonp|jscallback|jsoncallback)", &["XSS", "JSONP"]),
        (
            "(name|username|user|userid|uid|nickname|login|log|usr)",
            &["XSS", "IDOR"],
        ),
        (
            "(message|msg|text|comment|subject|body|content|feedback|review)",
            &["XSS"],
        ),
        (
            "(redirect|url|return|next|goto|redirect_to|redirect_uri|return_to|dest|destination|redir|returnurl|forward|referrer|referer)",
            &["XSS", "Open Redirect", "SSRF"],
        ),
        ("(email|mail|em)", &["XSS"]),
        ("(bio|profile|about|description|desc)", &["XSS"]),
        (
            "(file|filename|path|pathname|document|img|image|resource|page|include|load|view|show|display|template|style)",
            &["XSS", "LFI", "SSRF"],
        ),
        ("(lang|language|locale)", &["XSS", "LFI"]),
        (
            "(id|item|pid|product_id|prod_id|p_id|cat|category|cat_id|category_id|article|aid|article_id|user_id|uid|userid|account|number|order|no|jobid)",
            &["SQLi", "IDOR"],
        ),
        (
            "(select|from|where|union|order|by|group|insert|update|delete)",
            &["SQLi"],
        ),
        ("(sort|sort_by|order_by|orderby)", &["SQLi"]),
        ("(filter|criteria|field)", &["SQLi"]),
        (
            "(url|uri|u|site|host|domain|proxy|fetch|remote|feed|rss|report|external|api_url|service_url)",
            &["SSRF", "XSS"],
        ),
        (
            "(path|file|dir|directory|folder|include|require|import|template|document|resource|show|view)",
            &["LFI", "SSRF"],
        ),
        ("(config|cfg|conf|ini|env|setting|properties)", &["LFI"]),
        (
            "(id|uid|user_id|account_id|profile_id|order_id|message_id|doc_id|item_id|customer_id|cid|pid|edit_id|delete_id|object_id)",
            &["IDOR", "SQLi"],
        ),
        (
            "(token|csrf|xsrf|nonce|key|secret|auth|pass|pwd|password|api_key|session|sid|sessid)",
            &["CSRF", "Sensitive"],
        ),
        (
            "(debug|test|enable|disable|admin|root|mode|dev|development|beta|stage|staging)",
            &["Other"],
        ),
        ("([a-z0-9_]{2,30})", &["Other"]),
    ];
    table
        .iter()
        .map(|(pattern, tags)| {
            (
                Regex::new(&format!("(?i)^(?:{pattern})$")).unwrap(),
                *tags,
            )
        })
        .collect()
});

/// Tag a parameter name with the vulnerability classes it hints at
pub fn classify_param(name: &str) -> BTreeSet<String> {
    let lower = name.to_lowercase();
    let mut tags = BTreeSet::new();
    for (regex, pattern_tags) in PARAM_PATTERNS.iter() {
        if regex.is_match(&lower) {
            for tag in *pattern_tags {
                tags.insert((*tag).to_string());
            }
        }
    }
    tags
}

/// Fuzzy match for parameter names that likely control a redirect
pub fn is_likely_redirect_param(param: &str) -> bool {
    const NAMES: [&str; 29] = [
        "url", "redirect", "next", "target", "dest", "destination", "redir", "return",
        "returnto", "goto", "out", "continue", "forward", "to", "u", "link", "jump",
        "navigate", "path", "ref", "referrer", "callback", "back", "return_url",
        "redirect_url", "redirect_uri", "returnuri", "returl", "returnpath",
    ];
    let lower = param.to_lowercase();
    let stripped: String = lower.chars().filter(|c| c.is_ascii_lowercase()).collect();
    NAMES.iter().any(|n| lower.contains(n) || stripped == *n)
}

/// Query parameter names of a URL, in order
pub fn params_from_url(url: &str) -> Vec<(String, String)> {
    match Url::parse(url) {
        Ok(u) => u
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("data:")
    {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// Extract links, forms and parameters from a page. Pure and infallible;
/// an unparsable base URL yields an empty extraction.
pub fn extract(html: &str, base_url: &str) -> Extraction {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(_) => return Extraction::default(),
    };

    let mut out = Extraction::default();
    let mut seen_params: HashSet<(String, String, ParamSource)> = HashSet::new();
    let mut push_param =
        |out: &mut Extraction, url: String, name: String, value: Option<String>, source: ParamSource| {
            if name.is_empty() {
                return;
            }
            if seen_params.insert((url.clone(), name.clone(), source)) {
                let tags = classify_param(&name);
                out.params.push(DiscoveredParameter {
                    url,
                    name,
                    value_example: value.filter(|v| !v.is_empty()),
                    source,
                    tags,
                });
            }
        };

    // Parameters of the page's own URL
    for (name, value) in params_from_url(base_url) {
        push_param(
            &mut out,
            base_url.to_string(),
            name,
            Some(value),
            ParamSource::Url,
        );
    }

    let document = Html::parse_document(html);

    let anchor_sel = Selector::parse("a[href]").unwrap();
    for element in document.select(&anchor_sel) {
        if let Some(href) = element.value().attr("href") {
            if let Some(link) = resolve(&base, href) {
                for (name, value) in params_from_url(&link) {
                    push_param(&mut out, link.clone(), name, Some(value), ParamSource::Url);
                }
                out.links.insert(link);
            }
        }
    }

    let form_sel = Selector::parse("form").unwrap();
    let input_sel = Selector::parse("input[name], textarea[name], select[name]").unwrap();
    for form in document.select(&form_sel) {
        let action = form.value().attr("action").unwrap_or("");
        let action_url = if action.is_empty() {
            Some(base.to_string())
        } else {
            resolve(&base, action)
        };
        let Some(action_url) = action_url else { continue };

        let method = form
            .value()
            .attr("method")
            .unwrap_or("GET")
            .to_uppercase();
        let mut inputs = Vec::new();
        for input in form.select(&input_sel) {
            if let Some(name) = input.value().attr("name") {
                let value = input.value().attr("value").map(|v| v.to_string());
                push_param(
                    &mut out,
                    action_url.clone(),
                    name.to_string(),
                    value,
                    ParamSource::Form,
                );
                inputs.push(name.to_string());
            }
        }
        out.links.insert(action_url.clone());
        out.forms.push(FormInfo {
            action: action_url,
            method,
            inputs,
        });
    }

    let meta_sel = Selector::parse(r#"meta[http-equiv="refresh"]"#).unwrap();
    for meta in document.select(&meta_sel) {
        if let Some(content) = meta.value().attr("content") {
            if let Some(caps) = META_REFRESH_RE.captures(content) {
                if let Some(link) = resolve(&base, caps[1].trim()) {
                    out.links.insert(link);
                }
            }
        }
    }

    let script_sel = Selector::parse("script").unwrap();
    for script in document.select(&script_sel) {
        if let Some(src) = script.value().attr("src") {
            if let Some(link) = resolve(&base, src) {
                for (name, value) in params_from_url(&link) {
                    push_param(&mut out, link.clone(), name, Some(value), ParamSource::Url);
                }
                out.links.insert(link);
            }
        }
        let text: String = script.text().collect();
        for caps in JS_LOCATION_RE.captures_iter(&text) {
            if let Some(link) = resolve(&base, &caps[1]) {
                out.links.insert(link);
            }
        }
        for caps in JS_PARAM_RE.captures_iter(&text) {
            push_param(
                &mut out,
                base_url.to_string(),
                caps[1].to_string(),
                None,
                ParamSource::Js,
            );
        }
    }

    // src/href on everything else (images, frames, stylesheets)
    let attr_sel = Selector::parse("[src], [href]").unwrap();
    for element in document.select(&attr_sel) {
        for attr in ["src", "href"] {
            if let Some(value) = element.value().attr(attr) {
                if let Some(link) = resolve(&base, value) {
                    for (name, value) in params_from_url(&link) {
                        push_param(
                            &mut out,
                            link.clone(),
                            name,
                            Some(value),
                            ParamSource::HtmlAttr,
                        );
                    }
                }
            }
        }
    }

    out
}

/// Scan free text for hostnames under the given root domains
pub fn extract_subdomains(text: &str, root_domains: &[String]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for m in HOSTNAME_RE.find_iter(text) {
        let host = m.as_str().trim_matches('.').to_lowercase();
        for root in root_domains {
            let root = root.to_lowercase();
            if host == root || host.ends_with(&format!(".{root}")) {
                found.insert(host.clone());
            }
        }
    }
    found
}
