// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Signature Matching
 * Pure response classification for every spider variant. No I/O here:
 * the same inputs always yield the same findings, and every matching
 * rule fires (one response can produce several findings).
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::browser::FrameProbe;
use crate::dns::DnsRecords;
use crate::fetcher::FetchResult;
use crate::types::{Finding, FindingStatus, ScanMode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// ---------------------------------------------------------------------
// Open redirect
// ---------------------------------------------------------------------

/// Everything needed to judge one fuzzed response
pub struct RedirectContext<'a> {
    /// Endpoint the payload was aimed at
    pub original_url: &'a str,
    /// Exact URL (or form target) that was requested
    pub tested_url: &'a str,
    pub parameter: &'a str,
    pub payload: &'a str,
    pub method: &'a str,
    /// "query" or "form"
    pub request_type: &'a str,
    pub canary_host: &'a str,
    pub response: &'a FetchResult,
}

static META_REFRESH_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<meta\s+http-equiv=["']refresh["'][^>]*content=["'][^"']*url=([^"'>]+)["']"#,
    )
    .unwrap()
});

fn canary_regex(canary_host: &str) -> Regex {
    // The host is configuration, not user input, but escape it anyway
    Regex::new(&format!("(?i){}", regex::escape(canary_host)))
        .unwrap_or_else(|_| Regex::new(r"(?i)evil\.com").unwrap())
}

fn js_redirect_regex(canary_host: &str) -> Regex {
    let host = regex::escape(canary_host);
    Regex::new(&format!(
        r#"(?i)(?:location\.(?:href|replace|assign)|window\.location)\s*=\s*['"]https?://{host}"#
    ))
    .unwrap_or_else(|_| {
        Regex::new(r#"(?i)location\.href\s*=\s*['"]https?://evil\.com"#).unwrap()
    })
}

/// Classify one fuzzed response. All matching rules fire.
pub fn classify_open_redirect(ctx: &RedirectContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    let canary = canary_regex(ctx.canary_host);
    let resp = ctx.response;

    let base = |vuln_type: &str, status: FindingStatus, evidence: String| {
        Finding::new(vuln_type, ctx.original_url, status, evidence)
            .with_parameter(ctx.parameter)
            .with_payload(ctx.payload)
            .with_method(ctx.method)
            .with_extra("requestType", ctx.request_type)
            .with_extra("urlTested", ctx.tested_url)
    };

    // 1. HTTP redirect to the canary host
    if let Some(location) = resp.location() {
        if canary.is_match(location) {
            let mut finding = base(
                "Open Redirect",
                FindingStatus::Redirected,
                format!("Location: {location}"),
            );
            if let Ok(chain) = serde_json::to_string(&resp.redirect_chain) {
                finding = finding.with_extra("redirectChain", chain);
            }
            findings.push(finding);
        }
    }

    // 2. Meta refresh
    if let Some(caps) = META_REFRESH_URL_RE.captures(&resp.body) {
        if canary.is_match(&caps[1]) {
            findings.push(base(
                "Open Redirect (Meta Refresh)",
                FindingStatus::MetaRefresh,
                format!("Meta refresh to: {}", &caps[1]),
            ));
        }
    }

    // 3. JS-based redirect
    if js_redirect_regex(ctx.canary_host).is_match(&resp.body) {
        findings.push(base(
            "Open Redirect (JS)",
            FindingStatus::JsRedirect,
            "JS-based redirect found in response body".to_string(),
        ));
    }

    // 4. Reflected payload
    if !ctx.payload.is_empty() && resp.body.contains(ctx.payload) {
        findings.push(base(
            "Potential Open Redirect (Reflected)",
            FindingStatus::Reflected,
            "Payload reflected in response body".to_string(),
        ));
    }

    // 5. Cookie-based redirect
    if resp.cookies.iter().any(|c| canary.is_match(c)) {
        findings.push(base(
            "Open Redirect (Cookie)",
            FindingStatus::Cookie,
            format!("Set-Cookie: {}", resp.cookies.join("; ")),
        ));
    }

    findings
}

// ---------------------------------------------------------------------
// Clickjacking
// ---------------------------------------------------------------------

static SENSITIVE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(login|account|settings|delete|update|admin|user|profile|bank|fund|transfer|password|secure|checkout|cart|payment|pay|order|purchase)",
    )
    .unwrap()
});

static FRAME_BUSTING_JS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(top\.location|top\s*!==?\s*self|self\s*!==?\s*top|parent\.frames\.length|window\.top\s*!==?\s*window\.self)").unwrap()
});

/// Paths where a working clickjack does real damage
pub fn is_sensitive_url(url: &str) -> bool {
    SENSITIVE_URL_RE.is_match(url)
}

/// Human-readable summary of anti-framing headers
pub fn frame_protections(headers: &HashMap<String, String>) -> String {
    let mut protections = Vec::new();
    if let Some(xfo) = headers.get("x-frame-options") {
        protections.push(format!("X-Frame-Options: {xfo}"));
    }
    if let Some(csp) = headers.get("content-security-policy") {
        if csp.to_lowercase().contains("frame-ancestors") {
            protections.push(format!("CSP frame-ancestors: {csp}"));
        }
    }
    if let Some(pp) = headers.get("permissions-policy") {
        protections.push(format!("Permissions-Policy: {pp}"));
    }
    if protections.is_empty() {
        "None".to_string()
    } else {
        protections.join("; ")
    }
}

/// Classify a browser frame probe
pub fn classify_frame_probe(url: &str, mode_name: &str, probe: &FrameProbe) -> Finding {
    let protections = frame_protections(&probe.headers);
    let embeddable = probe.loaded && !probe.frame_busting && !probe.navigation_blocked;
    let sensitive = is_sensitive_url(url);

    let finding = if embeddable {
        if probe.click_registered {
            let vuln_type = if sensitive {
                "Critical Clickjacking"
            } else {
                "Clickjacking"
            };
            Finding::new(
                vuln_type,
                url,
                FindingStatus::Vulnerable,
                "Page loads in iframe and accepts user interaction",
            )
        } else {
            Finding::new(
                "Embeddable",
                url,
                FindingStatus::Potential,
                "Page loads in iframe but click not observed",
            )
        }
    } else {
        let reason = if probe.frame_busting {
            "Frame-busting script escaped the iframe"
        } else if probe.navigation_blocked {
            "Frame busting attempted but blocked by sandbox"
        } else {
            "Page did not load in iframe"
        };
        Finding::new("Clickjacking", url, FindingStatus::Protected, reason)
    };

    finding
        .with_extra("iframeMode", mode_name)
        .with_extra("protections", protections)
        .with_extra("sensitive", if sensitive { "true" } else { "false" })
}

/// Headers-only classification, used when no browser session is attached.
/// Non-HTML and error responses yield nothing.
pub fn classify_frame_headers(
    url: &str,
    status: u16,
    headers: &HashMap<String, String>,
    body: &str,
) -> Option<Finding> {
    if status == 404 || status >= 500 {
        return None;
    }
    if let Some(ct) = headers.get("content-type") {
        if !ct.contains("html") {
            return None;
        }
    }

    let protections = frame_protections(headers);
    let sensitive = is_sensitive_url(url);

    let xfo_denies = headers
        .get("x-frame-options")
        .map(|v| {
            let v = v.to_uppercase();
            v.contains("DENY") || v.contains("SAMEORIGIN")
        })
        .unwrap_or(false);
    let csp_denies = headers
        .get("content-security-policy")
        .map(|v| v.to_lowercase().contains("frame-ancestors"))
        .unwrap_or(false);

    let finding = if xfo_denies || csp_denies {
        Finding::new(
            "Clickjacking",
            url,
            FindingStatus::Protected,
            format!("Framing denied by response headers ({protections})"),
        )
    } else if FRAME_BUSTING_JS_RE.is_match(body) {
        Finding::new(
            "Clickjacking",
            url,
            FindingStatus::Protected,
            "No anti-framing headers, but frame-busting script present",
        )
    } else {
        let vuln_type = if sensitive {
            "Critical Clickjacking"
        } else {
            "Embeddable"
        };
        Finding::new(
            vuln_type,
            url,
            FindingStatus::Potential,
            "No anti-framing headers or frame-busting script detected",
        )
    };

    Some(
        finding
            .with_extra("protections", protections)
            .with_extra("sensitive", if sensitive { "true" } else { "false" }),
    )
}

// ---------------------------------------------------------------------
// Subdomain takeover
// ---------------------------------------------------------------------

/// Known claimable-service fingerprints, matched case-insensitively
/// against response bodies
pub struct ServiceFingerprint {
    pub service: &'static str,
    pub body_signatures: &'static [&'static str],
}

pub const SERVICE_FINGERPRINTS: &[ServiceFingerprint] = &[
    ServiceFingerprint {
        service: "GitHub Pages",
        body_signatures: &["there isn't a github pages site here", "repository not found"],
    },
    ServiceFingerprint {
        service: "Heroku",
        body_signatures: &["no such app", "herokucdn.com error"],
    },
    ServiceFingerprint {
        service: "AWS S3",
        body_signatures: &["nosuchbucket", "the specified bucket does not exist"],
    },
    ServiceFingerprint {
        service: "Netlify",
        body_signatures: &["not found - request id", "page not found"],
    },
    ServiceFingerprint {
        service: "Shopify",
        body_signatures: &["sorry, this shop is currently unavailable"],
    },
    ServiceFingerprint {
        service: "Fastly",
        body_signatures: &["fastly error: unknown domain"],
    },
    ServiceFingerprint {
        service: "Zendesk",
        body_signatures: &["help center closed", "subdomain not found"],
    },
    ServiceFingerprint {
        service: "Tumblr",
        body_signatures: &[
            "there's nothing here",
            "whatever you were looking for doesn't currently exist",
        ],
    },
    ServiceFingerprint {
        service: "WordPress.com",
        body_signatures: &["do you want to register"],
    },
    ServiceFingerprint {
        service: "Surge.sh",
        body_signatures: &["project not found"],
    },
    ServiceFingerprint {
        service: "Pantheon",
        body_signatures: &["404 error unknown site"],
    },
    ServiceFingerprint {
        service: "Azure",
        body_signatures: &["404 web site not found"],
    },
    ServiceFingerprint {
        service: "Read the Docs",
        body_signatures: &["unknown repository"],
    },
    ServiceFingerprint {
        service: "Statuspage",
        body_signatures: &["this page is parked"],
    },
    ServiceFingerprint {
        service: "Squarespace",
        body_signatures: &["no such site at this address"],
    },
    ServiceFingerprint {
        service: "CloudFront",
        body_signatures: &["error: the request could not be satisfied"],
    },
    ServiceFingerprint {
        service: "Teamwork",
        body_signatures: &["oops - we didn't find your site"],
    },
    ServiceFingerprint {
        service: "Helpjuice",
        body_signatures: &["we could not find what you're looking for"],
    },
    ServiceFingerprint {
        service: "Cargo",
        body_signatures: &["the page you were looking for doesn't exist"],
    },
];

/// Generic abandoned-service phrases, checked after the service table
pub const ERROR_SIGNATURES: &[&str] = &[
    "no such app",
    "there is no site here yet",
    "this domain is not configured",
    "repository not found",
    "this page is parked",
    "does not exist",
    "unknown domain",
    "help center closed",
    "subdomain not found",
    "project not found",
    "not found",
];

/// HTTP statuses that look like a dangling claimable endpoint.
/// 0 stands for a transport-level failure.
const TAKEOVER_ERROR_STATUSES: [u16; 5] = [0, 400, 403, 404, 502];

pub fn match_service(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    for fingerprint in SERVICE_FINGERPRINTS {
        for signature in fingerprint.body_signatures {
            if lower.contains(signature) {
                return Some(fingerprint.service);
            }
        }
    }
    None
}

pub fn match_error_signature(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    ERROR_SIGNATURES.iter().copied().find(|s| lower.contains(*s))
}

/// Classify one subdomain. `probe` is None in passive mode or when the
/// HTTP probe failed outright (status 0).
pub fn classify_takeover(
    subdomain: &str,
    dns: &DnsRecords,
    probe: Option<&FetchResult>,
    mode: ScanMode,
) -> Finding {
    let dns_summary = format!(
        "A: [{}], CNAME: [{}], DNSSEC: {}",
        dns.a.join(", "),
        dns.cname.join(", "),
        dns.dnssec
    );

    if mode == ScanMode::Passive {
        let finding = if dns.cname.is_empty() {
            Finding::new(
                "Subdomain Takeover",
                subdomain,
                FindingStatus::NoCname,
                "No CNAME record",
            )
        } else {
            Finding::new(
                "Subdomain Takeover",
                subdomain,
                FindingStatus::CnameFound,
                format!("CNAME: {}", dns.cname.join(", ")),
            )
        };
        return finding.with_extra("dns", dns_summary);
    }

    if !dns.resolves() {
        return Finding::new(
            "Subdomain Takeover",
            subdomain,
            FindingStatus::NoIssue,
            if dns.nxdomain {
                "Host does not resolve (NXDOMAIN)"
            } else {
                "Host does not resolve"
            },
        )
        .with_extra("dns", dns_summary);
    }

    let status = probe.map(|r| r.status_code).unwrap_or(0);
    let body = probe.map(|r| r.body.as_str()).unwrap_or("");
    let service = match_service(body);
    let error_signature = match_error_signature(body);

    let suspicious =
        TAKEOVER_ERROR_STATUSES.contains(&status) || service.is_some() || error_signature.is_some();

    let mut finding = if suspicious {
        let reason = if let Some(service) = service {
            format!("Service fingerprint matched: {service} (status {status})")
        } else if let Some(sig) = error_signature {
            format!("Error signature matched: \"{sig}\" (status {status})")
        } else {
            format!("DNS resolves but endpoint answers with status {status}")
        };
        Finding::new(
            "Subdomain Takeover",
            subdomain,
            FindingStatus::PotentialTakeover,
            reason,
        )
    } else {
        Finding::new(
            "Subdomain Takeover",
            subdomain,
            FindingStatus::NoIssue,
            format!("Endpoint healthy (status {status})"),
        )
    };

    finding = finding.with_extra("dns", dns_summary);
    if let Some(service) = service {
        finding = finding.with_extra("service", service);
    }
    if let Some(headers) = probe.map(|r| &r.headers) {
        let missing = missing_security_headers(headers);
        if !missing.is_empty() {
            finding = finding.with_extra("missingHeaders", missing.join(", "));
        }
    }
    if dns.dnssec {
        finding = finding.with_extra("dnssec", "true");
    }
    finding
}

// ---------------------------------------------------------------------
// Shared page-level analysis (CORS, CSRF, security headers)
// ---------------------------------------------------------------------

const EXPECTED_SECURITY_HEADERS: [&str; 6] = [
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "x-xss-protection",
];

pub fn missing_security_headers(headers: &HashMap<String, String>) -> Vec<&'static str> {
    EXPECTED_SECURITY_HEADERS
        .iter()
        .filter(|h| !headers.contains_key(**h))
        .copied()
        .collect()
}

/// Flag permissive CORS configurations
pub fn analyze_cors(url: &str, headers: &HashMap<String, String>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let origin = headers.get("access-control-allow-origin").map(|s| s.trim());
    let credentials = headers
        .get("access-control-allow-credentials")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    match origin {
        Some("*") if credentials => {
            findings.push(Finding::new(
                "CORS Misconfiguration",
                url,
                FindingStatus::Vulnerable,
                "Access-Control-Allow-Origin: * with credentials allowed",
            ));
        }
        Some("*") => {
            findings.push(Finding::new(
                "CORS Misconfiguration",
                url,
                FindingStatus::Potential,
                "Access-Control-Allow-Origin: * (wildcard origin)",
            ));
        }
        Some("null") => {
            findings.push(Finding::new(
                "CORS Misconfiguration",
                url,
                FindingStatus::Potential,
                "Access-Control-Allow-Origin: null is attacker-forgeable",
            ));
        }
        _ => {}
    }
    findings
}

static CSRF_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<input[^>]*name=["']([^"']*(?:csrf|xsrf|token|authenticity_token|csrfmiddlewaretoken|anticsrf|requesttoken)[^"']*)["'][^>]*>"#,
    )
    .unwrap()
});

static INPUT_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)value=["']([^"']*)["']"#).unwrap());

static POST_FORM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<form[^>]*method=["']?post["']?[^>]*>"#).unwrap());

/// Flag POST forms with missing or weak CSRF tokens
pub fn analyze_csrf(url: &str, body: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let has_post_form = POST_FORM_RE.is_match(body);
    if !has_post_form {
        return findings;
    }

    let mut token_seen = false;
    for caps in CSRF_INPUT_RE.captures_iter(body) {
        token_seen = true;
        let input_tag = caps.get(0).map(|m| m.as_str()).unwrap_or("");
        let name = &caps[1];
        let value = INPUT_VALUE_RE
            .captures(input_tag)
            .map(|v| v[1].to_string())
            .unwrap_or_default();
        if value.len() < 8 {
            findings.push(
                Finding::new(
                    "CSRF",
                    url,
                    FindingStatus::Weak,
                    format!("CSRF token \"{name}\" has a short or empty value"),
                )
                .with_parameter(name),
            );
        }
    }

    if !token_seen {
        findings.push(Finding::new(
            "CSRF",
            url,
            FindingStatus::Potential,
            "POST form without a recognizable CSRF token",
        ));
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::RedirectHop;

    fn response(status: u16, body: &str) -> FetchResult {
        FetchResult {
            status_code: status,
            headers: HashMap::new(),
            body: body.to_string(),
            redirect_chain: Vec::new(),
            cookies: Vec::new(),
            final_url: "https://example.com/".to_string(),
        }
    }

    fn redirect_ctx<'a>(resp: &'a FetchResult) -> RedirectContext<'a> {
        RedirectContext {
            original_url: "https://example.com/login?next=/home",
            tested_url: "https://example.com/login?next=https%3A%2F%2Fevil.com",
            parameter: "next",
            payload: "https://evil.com",
            method: "GET",
            request_type: "query",
            canary_host: "evil.com",
            response: resp,
        }
    }

    #[test]
    fn test_redirect_to_canary_detected() {
        let mut resp = response(302, "");
        resp.redirect_chain.push(RedirectHop {
            url: "https://example.com/login?next=https%3A%2F%2Fevil.com".to_string(),
            status: 302,
            location: "https://evil.com/".to_string(),
        });
        let findings = classify_open_redirect(&redirect_ctx(&resp));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].vuln_type, "Open Redirect");
        assert_eq!(findings[0].status, FindingStatus::Redirected);
        assert!(findings[0].evidence.contains("evil.com"));
        assert_eq!(findings[0].parameter.as_deref(), Some("next"));
    }

    #[test]
    fn test_all_matching_rules_fire() {
        let body = r#"
            <meta http-equiv="refresh" content="0;url=https://evil.com/x">
            <script>location.href = 'https://evil.com/y';</script>
            payload echo: https://evil.com
        "#;
        let resp = response(200, body);
        let findings = classify_open_redirect(&redirect_ctx(&resp));
        let types: Vec<&str> = findings.iter().map(|f| f.vuln_type.as_str()).collect();
        assert!(types.contains(&"Open Redirect (Meta Refresh)"));
        assert!(types.contains(&"Open Redirect (JS)"));
        assert!(types.contains(&"Potential Open Redirect (Reflected)"));
        assert_eq!(findings.len(), 3);
    }

    #[test]
    fn test_cookie_redirect_detected() {
        let mut resp = response(200, "");
        resp.cookies.push("dest=https://evil.com/; Path=/".to_string());
        let findings = classify_open_redirect(&redirect_ctx(&resp));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, FindingStatus::Cookie);
    }

    #[test]
    fn test_clean_response_yields_nothing() {
        let resp = response(200, "<html><body>Welcome back</body></html>");
        assert!(classify_open_redirect(&redirect_ctx(&resp)).is_empty());
    }

    #[test]
    fn test_classification_is_pure() {
        let resp = response(200, "echo https://evil.com");
        let ctx = redirect_ctx(&resp);
        assert_eq!(classify_open_redirect(&ctx), classify_open_redirect(&ctx));
    }

    #[test]
    fn test_frame_probe_vulnerable_sensitive() {
        let probe = FrameProbe {
            loaded: true,
            click_registered: true,
            ..FrameProbe::default()
        };
        let finding =
            classify_frame_probe("https://example.com/account/settings", "No Sandbox", &probe);
        assert_eq!(finding.vuln_type, "Critical Clickjacking");
        assert_eq!(finding.status, FindingStatus::Vulnerable);
    }

    #[test]
    fn test_frame_probe_embeddable_without_click() {
        let probe = FrameProbe {
            loaded: true,
            ..FrameProbe::default()
        };
        let finding = classify_frame_probe("https://example.com/docs", "No Sandbox", &probe);
        assert_eq!(finding.vuln_type, "Embeddable");
        assert_eq!(finding.status, FindingStatus::Potential);
    }

    #[test]
    fn test_frame_probe_busting_is_protected() {
        let probe = FrameProbe {
            loaded: true,
            frame_busting: true,
            click_registered: true,
            ..FrameProbe::default()
        };
        let finding = classify_frame_probe("https://example.com/login", "allow-scripts", &probe);
        assert_eq!(finding.status, FindingStatus::Protected);
    }

    #[test]
    fn test_frame_headers_xfo_deny_protected() {
        let mut headers = HashMap::new();
        headers.insert("x-frame-options".to_string(), "DENY".to_string());
        headers.insert("content-type".to_string(), "text/html".to_string());
        let finding =
            classify_frame_headers("https://example.com/login", 200, &headers, "").unwrap();
        assert_eq!(finding.status, FindingStatus::Protected);
        assert!(finding.extra["protections"].contains("X-Frame-Options: DENY"));
    }

    #[test]
    fn test_frame_headers_skip_non_html_and_errors() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        assert!(classify_frame_headers("https://example.com/api", 200, &headers, "").is_none());
        assert!(classify_frame_headers("https://example.com/x", 404, &HashMap::new(), "").is_none());
    }

    #[test]
    fn test_takeover_github_pages_fingerprint() {
        let dns = DnsRecords {
            cname: vec!["org.github.io".to_string()],
            ..DnsRecords::default()
        };
        let resp = response(404, "<html>There isn't a GitHub Pages site here.</html>");
        let finding = classify_takeover("old.example.com", &dns, Some(&resp), ScanMode::Active);
        assert_eq!(finding.status, FindingStatus::PotentialTakeover);
        assert_eq!(finding.extra.get("service").map(|s| s.as_str()), Some("GitHub Pages"));
    }

    #[test]
    fn test_takeover_healthy_endpoint_no_issue() {
        let dns = DnsRecords {
            a: vec!["93.184.216.34".to_string()],
            ..DnsRecords::default()
        };
        let resp = response(200, "<html>Our product page</html>");
        let finding = classify_takeover("www.example.com", &dns, Some(&resp), ScanMode::Active);
        assert_eq!(finding.status, FindingStatus::NoIssue);
    }

    #[test]
    fn test_takeover_transport_failure_is_suspicious() {
        let dns = DnsRecords {
            cname: vec!["abandoned.herokuapp.com".to_string()],
            ..DnsRecords::default()
        };
        let finding = classify_takeover("shop.example.com", &dns, None, ScanMode::Active);
        assert_eq!(finding.status, FindingStatus::PotentialTakeover);
    }

    #[test]
    fn test_takeover_passive_mode_reports_cname_only() {
        let dns = DnsRecords {
            cname: vec!["org.github.io".to_string()],
            ..DnsRecords::default()
        };
        let finding = classify_takeover("old.example.com", &dns, None, ScanMode::Passive);
        assert_eq!(finding.status, FindingStatus::CnameFound);

        let finding =
            classify_takeover("www.example.com", &DnsRecords::default(), None, ScanMode::Passive);
        assert_eq!(finding.status, FindingStatus::NoCname);
    }

    #[test]
    fn test_cors_wildcard_with_credentials() {
        let mut headers = HashMap::new();
        headers.insert("access-control-allow-origin".to_string(), "*".to_string());
        headers.insert(
            "access-control-allow-credentials".to_string(),
            "true".to_string(),
        );
        let findings = analyze_cors("https://api.example.com", &headers);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, FindingStatus::Vulnerable);
    }

    #[test]
    fn test_csrf_missing_token() {
        let body = r#"<form method="post" action="/transfer"><input name="amount"></form>"#;
        let findings = analyze_csrf("https://example.com/transfer", body);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, FindingStatus::Potential);
    }

    #[test]
    fn test_csrf_weak_token_value() {
        let body = r#"<form method="post"><input name="csrf_token" value="abc"></form>"#;
        let findings = analyze_csrf("https://example.com/form", body);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, FindingStatus::Weak);
    }

    #[test]
    fn test_missing_security_headers() {
        let mut headers = HashMap::new();
        headers.insert("content-security-policy".to_string(), "default-src 'self'".to_string());
        let missing = missing_security_headers(&headers);
        assert!(missing.contains(&"strict-transport-security"));
        assert!(!missing.contains(&"content-security-policy"));
    }
}
