// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Browser Capability Surface
 * Headless-browser session trait and the iframe probe used by the
 * clickjacking spider. No concrete driver ships with the engine; the
 * embedding host provides one.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::SpiderResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Iframe sandbox variants tested against every page
pub const IFRAME_MODES: &[IframeMode] = &[
    IframeMode { name: "No Sandbox", attr: "" },
    IframeMode { name: "allow-scripts", attr: "sandbox=\"allow-scripts\"" },
    IframeMode { name: "allow-forms allow-scripts", attr: "sandbox=\"allow-forms allow-scripts\"" },
    IframeMode { name: "allow-same-origin allow-scripts", attr: "sandbox=\"allow-same-origin allow-scripts\"" },
    IframeMode { name: "allow-top-navigation", attr: "sandbox=\"allow-top-navigation\"" },
    IframeMode { name: "allow-popups", attr: "sandbox=\"allow-popups\"" },
    IframeMode { name: "allow-forms allow-scripts allow-same-origin", attr: "sandbox=\"allow-forms allow-scripts allow-same-origin\"" },
    IframeMode { name: "allowfullscreen", attr: "allowfullscreen" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IframeMode {
    pub name: &'static str,
    pub attr: &'static str,
}

/// What a frame probe observed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameProbe {
    /// Target rendered inside the iframe
    pub loaded: bool,
    /// Frame-busting script escaped (or tried to escape) the frame
    pub frame_busting: bool,
    /// Top navigation was blocked by the sandbox while busting
    pub navigation_blocked: bool,
    /// A synthetic click inside the harness reached the page
    pub click_registered: bool,
    /// The framed page renders a full-size high-z-index overlay, a
    /// common click-interception defense
    pub overlay_detected: bool,
    pub js_errors: Vec<String>,
    /// Response headers of the framed document, when observable
    pub headers: HashMap<String, String>,
}

/// Minimal browser surface the clickjacking spider needs
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str, timeout: Duration) -> SpiderResult<()>;
    async fn set_content(&self, html: &str) -> SpiderResult<()>;
    async fn evaluate(&self, script: &str) -> SpiderResult<Value>;
    async fn click(&self, x: f64, y: f64) -> SpiderResult<()>;
    async fn response_headers(&self, url: &str) -> Option<HashMap<String, String>>;
    async fn close(&self) -> SpiderResult<()>;
}

const LOAD_POLL: Duration = Duration::from_millis(250);

/// Inject the target into an iframe with the given sandbox mode and
/// observe how it behaves. Driver failures surface as an unloaded probe
/// rather than an error; one bad page must not kill the run.
pub async fn probe_frame(
    session: &dyn BrowserSession,
    url: &str,
    mode: &IframeMode,
    timeout: Duration,
) -> FrameProbe {
    let mut probe = FrameProbe::default();

    if session.navigate("about:blank", timeout).await.is_err() {
        probe.js_errors.push("navigation to blank page failed".into());
        return probe;
    }

    // The script block seeds every marker the probe polls below; a
    // sandboxed busting attempt surfaces as a SecurityError on the
    // harness window.
    let harness = format!(
        r#"<html><body style="margin:0">
        <iframe id="cjtest" src="{url}" {attr}
            style="width:100vw;height:100vh;border:0"
            onload="window.__frameLoaded = true"></iframe>
        <script>
        window.__frameClicked = false;
        window.__topNavigationBlocked = false;
        window.addEventListener('error', function (e) {{
            if (/SecurityError|top-navigation|sandbox/i.test(e.message || '')) {{
                window.__topNavigationBlocked = true;
            }}
        }});
        </script>
        </body></html>"#,
        url = url,
        attr = mode.attr,
    );
    if session.set_content(&harness).await.is_err() {
        probe.js_errors.push("iframe injection failed".into());
        return probe;
    }

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match session.evaluate("window.__frameLoaded === true").await {
            Ok(Value::Bool(true)) => {
                probe.loaded = true;
                break;
            }
            Ok(_) => {}
            Err(err) => {
                probe.js_errors.push(err.to_string());
                break;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(LOAD_POLL).await;
    }

    if !probe.loaded {
        return probe;
    }

    // A busting frame replaces the top document; our harness marker
    // disappears when that happens.
    match session
        .evaluate("document.getElementById('cjtest') === null")
        .await
    {
        Ok(Value::Bool(true)) => probe.frame_busting = true,
        Ok(_) => {}
        Err(err) => probe.js_errors.push(err.to_string()),
    }
    if !probe.frame_busting {
        // Busting that the sandbox swallowed shows up as a SecurityError
        if let Ok(Value::Bool(true)) = session
            .evaluate("window.__topNavigationBlocked === true")
            .await
        {
            probe.navigation_blocked = true;
        }
    }

    // The listener must be in place before the synthetic click fires
    let install = session
        .evaluate(
            "document.body.addEventListener('click', function () { \
                window.__frameClicked = true; \
            }, true); true",
        )
        .await;
    if install.is_ok() && session.click(100.0, 100.0).await.is_ok() {
        if let Ok(Value::Bool(true)) = session.evaluate("window.__frameClicked === true").await {
            probe.click_registered = true;
        }
    }

    // Only readable for same-origin frames; cross-origin access throws
    // and counts as no overlay
    if let Ok(Value::Bool(true)) = session
        .evaluate(
            "(function () { try { \
                var doc = document.querySelector('iframe').contentDocument; \
                if (!doc) { return false; } \
                return Array.prototype.some.call(doc.querySelectorAll('*'), function (el) { \
                    var s = doc.defaultView.getComputedStyle(el); \
                    return s.position === 'fixed' && parseInt(s.zIndex, 10) > 1000; \
                }); \
            } catch (e) { return false; } })()",
        )
        .await
    {
        probe.overlay_detected = true;
    }

    if let Some(headers) = session.response_headers(url).await {
        probe.headers = headers;
    }

    probe
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::errors::SpiderResult;
    use std::sync::Mutex;

    /// Scripted browser: answers `evaluate` from a queue of canned
    /// (script substring, value) pairs.
    pub struct MockBrowser {
        pub answers: Mutex<Vec<(&'static str, Value)>>,
        pub headers: HashMap<String, String>,
    }

    impl MockBrowser {
        pub fn new(answers: Vec<(&'static str, Value)>) -> Self {
            Self {
                answers: Mutex::new(answers),
                headers: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl BrowserSession for MockBrowser {
        async fn navigate(&self, _url: &str, _timeout: Duration) -> SpiderResult<()> {
            Ok(())
        }

        async fn set_content(&self, _html: &str) -> SpiderResult<()> {
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> SpiderResult<Value> {
            let answers = self.answers.lock().unwrap();
            for (needle, value) in answers.iter() {
                if script.contains(needle) {
                    return Ok(value.clone());
                }
            }
            Ok(Value::Bool(false))
        }

        async fn click(&self, _x: f64, _y: f64) -> SpiderResult<()> {
            Ok(())
        }

        async fn response_headers(&self, _url: &str) -> Option<HashMap<String, String>> {
            Some(self.headers.clone())
        }

        async fn close(&self) -> SpiderResult<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockBrowser;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_probe_vulnerable_page() {
        let browser = MockBrowser::new(vec![
            ("__frameLoaded", json!(true)),
            ("cjtest", json!(false)),
            ("__frameClicked", json!(true)),
        ]);
        let probe = probe_frame(
            &browser,
            "https://example.com/settings",
            &IFRAME_MODES[0],
            Duration::from_secs(2),
        )
        .await;
        assert!(probe.loaded);
        assert!(!probe.frame_busting);
        assert!(probe.click_registered);
    }

    /// Driver that only reports a click when the harness installed the
    /// listener before the click fired, like a real page would
    struct ListenerAwareBrowser {
        listener_installed: std::sync::Mutex<bool>,
        clicked: std::sync::Mutex<bool>,
    }

    impl ListenerAwareBrowser {
        fn new() -> Self {
            Self {
                listener_installed: std::sync::Mutex::new(false),
                clicked: std::sync::Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl BrowserSession for ListenerAwareBrowser {
        async fn navigate(&self, _url: &str, _timeout: Duration) -> crate::errors::SpiderResult<()> {
            Ok(())
        }

        async fn set_content(&self, _html: &str) -> crate::errors::SpiderResult<()> {
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> crate::errors::SpiderResult<Value> {
            if script.contains("addEventListener('click'") {
                *self.listener_installed.lock().unwrap() = true;
                return Ok(Value::Bool(true));
            }
            if script.contains("__frameLoaded") {
                return Ok(Value::Bool(true));
            }
            if script.contains("__frameClicked") {
                let registered = *self.listener_installed.lock().unwrap()
                    && *self.clicked.lock().unwrap();
                return Ok(Value::Bool(registered));
            }
            Ok(Value::Bool(false))
        }

        async fn click(&self, _x: f64, _y: f64) -> crate::errors::SpiderResult<()> {
            *self.clicked.lock().unwrap() = true;
            Ok(())
        }

        async fn response_headers(&self, _url: &str) -> Option<HashMap<String, String>> {
            None
        }

        async fn close(&self) -> crate::errors::SpiderResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_click_listener_installed_before_click() {
        let browser = ListenerAwareBrowser::new();
        let probe = probe_frame(
            &browser,
            "https://example.com/settings",
            &IFRAME_MODES[0],
            Duration::from_secs(2),
        )
        .await;
        assert!(probe.loaded);
        assert!(probe.click_registered);
        assert!(*browser.listener_installed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_probe_frame_busting_page() {
        let browser = MockBrowser::new(vec![
            ("__frameLoaded", json!(true)),
            ("cjtest", json!(true)),
        ]);
        let probe = probe_frame(
            &browser,
            "https://example.com/",
            &IFRAME_MODES[1],
            Duration::from_secs(2),
        )
        .await;
        assert!(probe.loaded);
        assert!(probe.frame_busting);
        assert!(!probe.click_registered);
    }
}
