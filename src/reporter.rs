// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Reporter
 * Single emission path for findings: dedup, counters, event stream
 * and optional persistence
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::events::{Event, EventSink, LogSeverity, SpiderStatus};
use crate::store::FindingsStore;
use crate::types::Finding;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub struct Reporter {
    sink: Arc<dyn EventSink>,
    reported: Mutex<HashSet<String>>,
    found: AtomicU64,
    progress: AtomicU64,
    store: Option<Mutex<FindingsStore>>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            reported: Mutex::new(HashSet::new()),
            found: AtomicU64::new(0),
            progress: AtomicU64::new(0),
            store: None,
        }
    }

    pub fn with_store(mut self, store: FindingsStore) -> Self {
        self.store = Some(Mutex::new(store));
        self
    }

    pub fn log(&self, severity: LogSeverity, message: impl Into<String>) {
        self.sink.emit(Event::Log {
            message: message.into(),
            severity,
        });
    }

    /// Bump and emit the progress counter
    pub fn progress(&self) -> u64 {
        let n = self.progress.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.emit(Event::Progress(n));
        n
    }

    pub fn progress_count(&self) -> u64 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn found_count(&self) -> u64 {
        self.found.load(Ordering::SeqCst)
    }

    /// Report a finding. Duplicates (by stable hash) are dropped; new
    /// findings bump the found counter, hit the event stream and the
    /// store. Returns true when the finding was new.
    pub fn report(&self, finding: Finding) -> bool {
        let hash = finding.hash();
        {
            let mut reported = match self.reported.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !reported.insert(hash) {
                return false;
            }
        }

        let n = self.found.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.emit(Event::Found(n));

        if let Ok(json) = serde_json::to_string(&finding) {
            self.log(LogSeverity::Finding, format!("[FINDING] {json}"));
        }

        if let Some(store) = &self.store {
            let mut store = match store.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(err) = store.append(&finding) {
                warn!(error = %err, "Failed to persist finding");
                self.log(LogSeverity::Warn, format!("Failed to persist finding: {err}"));
            }
        }

        self.sink.emit(Event::Finding(finding));
        true
    }

    pub fn status(&self, status: SpiderStatus) {
        self.sink.emit(Event::Status(status));
    }

    pub fn clear(&self) {
        self.sink.emit(Event::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChannelSink;
    use crate::types::FindingStatus;

    fn sample_finding() -> Finding {
        Finding::new(
            "Open Redirect",
            "https://example.com/login?next=x",
            FindingStatus::Redirected,
            "Location: https://evil.com",
        )
        .with_parameter("next")
        .with_payload("https://evil.com")
    }

    #[tokio::test]
    async fn test_duplicate_findings_are_dropped() {
        let (sink, mut rx) = ChannelSink::new();
        let reporter = Reporter::new(Arc::new(sink));

        assert!(reporter.report(sample_finding()));
        assert!(!reporter.report(sample_finding()));
        assert_eq!(reporter.found_count(), 1);

        // found, log, finding; then nothing for the duplicate
        assert_eq!(rx.recv().await, Some(Event::Found(1)));
        assert!(matches!(rx.recv().await, Some(Event::Log { .. })));
        assert!(matches!(rx.recv().await, Some(Event::Finding(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_found_counter_is_monotone() {
        let (sink, _rx) = ChannelSink::new();
        let reporter = Reporter::new(Arc::new(sink));

        let mut last = 0;
        for i in 0..5 {
            let mut f = sample_finding();
            f.url = format!("https://example.com/{i}");
            reporter.report(f);
            let now = reporter.found_count();
            assert!(now > last);
            last = now;
        }
        assert_eq!(last, 5);
    }

    #[tokio::test]
    async fn test_progress_increments() {
        let (sink, mut rx) = ChannelSink::new();
        let reporter = Reporter::new(Arc::new(sink));

        assert_eq!(reporter.progress(), 1);
        assert_eq!(reporter.progress(), 2);
        assert_eq!(rx.recv().await, Some(Event::Progress(1)));
        assert_eq!(rx.recv().await, Some(Event::Progress(2)));
    }
}
