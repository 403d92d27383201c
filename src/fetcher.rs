// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - HTTP Fetcher
 * Retrying HTTP client with manual redirect following. Redirects are
 * followed by hand so every hop lands in the recorded chain; TLS
 * verification is disabled because spider targets are routinely
 * misconfigured or self-signed.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::{NetworkError, SpiderError, SpiderResult};
use crate::events::LogSeverity;
use crate::reporter::Reporter;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, SET_COOKIE, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Realistic desktop and mobile browser identities, rotated per request
const BROWSER_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 13; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
];

/// Pick a User-Agent from the pool
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    BROWSER_USER_AGENTS[rng.random_range(0..BROWSER_USER_AGENTS.len())]
}

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// Maximum redirect hops followed before surfacing the last response
    pub max_redirects: usize,

    /// Attempts made before a transport failure is surfaced
    pub max_retries: u32,

    /// Base retry delay, scaled linearly by attempt number
    pub retry_base_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_redirects: 5,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

/// One hop of a followed redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectHop {
    pub url: String,
    pub status: u16,
    pub location: String,
}

/// Outcome of a fetch. Any HTTP status is a valid result; only transport
/// failures after retry exhaustion become errors.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub redirect_chain: Vec<RedirectHop>,
    pub cookies: Vec<String>,
    pub final_url: String,
}

impl FetchResult {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    pub fn redirected(&self) -> bool {
        !self.redirect_chain.is_empty()
    }

    /// Location target of the first redirect hop, if any
    pub fn location(&self) -> Option<&str> {
        self.redirect_chain.first().map(|h| h.location.as_str())
    }
}

/// A request to be fetched
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn post_form(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::POST,
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body.into()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Retrying HTTP client shared by all spiders
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    reporter: Option<Arc<Reporter>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> SpiderResult<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout)
            .build()
            .map_err(SpiderError::from)?;
        Ok(Self {
            client,
            config,
            reporter: None,
        })
    }

    /// Attach a reporter so request activity shows up in the event stream
    pub fn with_reporter(mut self, reporter: Arc<Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn log(&self, severity: LogSeverity, message: String) {
        if let Some(reporter) = &self.reporter {
            reporter.log(severity, message);
        }
    }

    pub async fn get(&self, url: &str) -> SpiderResult<FetchResult> {
        self.fetch(FetchRequest::get(url)).await
    }

    pub async fn post_form(&self, url: &str, body: &str) -> SpiderResult<FetchResult> {
        self.fetch(FetchRequest::post_form(url, body)).await
    }

    /// Fetch with retries. Each attempt follows redirects up to the
    /// configured bound; a transport failure anywhere in the chain fails
    /// the whole attempt. Only retryable failures are attempted again.
    pub async fn fetch(&self, request: FetchRequest) -> SpiderResult<FetchResult> {
        let start_url = Url::parse(&request.url).map_err(|_| {
            SpiderError::Network(NetworkError::InvalidUrl {
                url: request.url.clone(),
            })
        })?;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(&start_url, &request).await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(url = %request.url, attempt, "Fetch succeeded after retry");
                    }
                    self.log(
                        LogSeverity::Http,
                        format!(
                            "{} {} -> {} ({} hops)",
                            request.method,
                            request.url,
                            result.status_code,
                            result.redirect_chain.len()
                        ),
                    );
                    return Ok(result);
                }
                Err(err) if !err.is_retryable() => {
                    debug!(url = %request.url, attempt, error = %err, "Fetch failed");
                    return Err(err);
                }
                Err(err) => {
                    if attempt >= self.config.max_retries {
                        debug!(
                            url = %request.url,
                            attempts = attempt,
                            error = %err,
                            "Fetch failed after retries"
                        );
                        return Err(SpiderError::Network(NetworkError::RetriesExhausted {
                            url: request.url.clone(),
                            attempts: attempt,
                            reason: err.to_string(),
                        }));
                    }
                    let delay = err.retry_delay().unwrap_or_else(|| self.retry_delay(attempt));
                    self.log(
                        LogSeverity::Warn,
                        format!(
                            "Retrying {} in {}ms (attempt {}/{}): {}",
                            request.url,
                            delay.as_millis(),
                            attempt + 1,
                            self.config.max_retries,
                            err
                        ),
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Delay before the next attempt, `retry_base_delay * attempt`
    fn retry_delay(&self, attempt: u32) -> Duration {
        self.config.retry_base_delay * attempt
    }

    async fn fetch_once(&self, start_url: &Url, request: &FetchRequest) -> SpiderResult<FetchResult> {
        let mut current_url = start_url.clone();
        let mut current_method = request.method.clone();
        let mut current_body = request.body.clone();
        let mut chain: Vec<RedirectHop> = Vec::new();

        loop {
            let mut headers = HeaderMap::new();
            headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
            for (name, value) in &request.headers {
                if let (Ok(n), Ok(v)) = (
                    reqwest::header::HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    headers.insert(n, v);
                }
            }

            let mut builder = self
                .client
                .request(current_method.clone(), current_url.clone())
                .headers(headers);
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(body) = &current_body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await.map_err(SpiderError::from)?;
            let status = response.status();

            if is_redirect(status) && chain.len() < self.config.max_redirects {
                if let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                {
                    let resolved = match current_url.join(location) {
                        Ok(u) => u,
                        // Unresolvable Location: surface the response as-is
                        Err(_) => return self.finalize(response, chain).await,
                    };
                    chain.push(RedirectHop {
                        url: current_url.to_string(),
                        status: status.as_u16(),
                        location: resolved.to_string(),
                    });
                    debug!(
                        from = %current_url,
                        to = %resolved,
                        status = status.as_u16(),
                        "Following redirect"
                    );
                    // 307/308 preserve the method and body, everything
                    // else degrades to GET
                    if !matches!(
                        status,
                        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
                    ) {
                        current_method = Method::GET;
                        current_body = None;
                    }
                    current_url = resolved;
                    continue;
                }
            }

            return self.finalize(response, chain).await;
        }
    }

    async fn finalize(
        &self,
        response: reqwest::Response,
        chain: Vec<RedirectHop>,
    ) -> SpiderResult<FetchResult> {
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut headers = HashMap::new();
        let mut cookies = Vec::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                if name == &SET_COOKIE {
                    cookies.push(value.to_string());
                }
                headers
                    .entry(name.as_str().to_lowercase())
                    .and_modify(|existing: &mut String| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
        }

        let body = response.text().await.unwrap_or_default();

        Ok(FetchResult {
            status_code,
            headers,
            body,
            redirect_chain: chain,
            cookies,
            final_url,
        })
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_statuses() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200, 204, 304, 400, 404, 500] {
            assert!(!is_redirect(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn test_retry_delay_scales_linearly() {
        let config = FetchConfig::default().with_retry_base_delay(Duration::from_millis(100));
        let fetcher = Fetcher::new(config).unwrap();
        assert_eq!(fetcher.retry_delay(1), Duration::from_millis(100));
        assert_eq!(fetcher.retry_delay(2), Duration::from_millis(200));
        assert_eq!(fetcher.retry_delay(3), Duration::from_millis(300));
    }

    #[test]
    fn test_user_agent_pool() {
        for _ in 0..20 {
            let ua = random_user_agent();
            assert!(BROWSER_USER_AGENTS.contains(&ua));
            assert!(ua.starts_with("Mozilla/5.0"));
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-frame-options".to_string(), "DENY".to_string());
        let result = FetchResult {
            status_code: 200,
            headers,
            body: String::new(),
            redirect_chain: Vec::new(),
            cookies: Vec::new(),
            final_url: "https://example.com/".to_string(),
        };
        assert_eq!(result.header("X-Frame-Options"), Some("DENY"));
        assert_eq!(result.header("x-frame-options"), Some("DENY"));
        assert!(result.header("content-security-policy").is_none());
        assert!(!result.redirected());
    }

    #[test]
    fn test_invalid_url_is_not_retried() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let err = rt.block_on(fetcher.get("not a url")).unwrap_err();
        assert!(matches!(
            err,
            SpiderError::Network(NetworkError::InvalidUrl { .. })
        ));
    }
}
