// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Control Protocol
 * Inbound start/stop messages and the single-run gatekeeper. The final
 * status event always fires, even when a run dies on a fatal error.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::{SpiderError, SpiderResult};
use crate::events::{Event, EventSink, LogSeverity, SpiderStatus};
use crate::frontier::{self, Spider, SpiderCx};
use crate::reporter::Reporter;
use crate::store::FindingsStore;
use crate::types::SpiderOptions;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Inbound control message
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlMessage {
    Start { data: SpiderOptions },
    Stop,
}

/// Parse one control line. Unknown message types and malformed JSON are
/// protocol errors; callers log and ignore them.
pub fn parse_control_message(line: &str) -> SpiderResult<ControlMessage> {
    serde_json::from_str(line).map_err(|e| SpiderError::ControlProtocol(e.to_string()))
}

/// Builds the spider variant for one run, wired to that run's reporter
pub type SpiderFactory =
    Arc<dyn Fn(Arc<Reporter>, &SpiderOptions) -> SpiderResult<Arc<dyn Spider>> + Send + Sync>;

struct RunHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Drives runs off the control stream. At most one frontier is live at
/// any time; a `start` during a run is ignored.
pub struct SpiderRunner {
    sink: Arc<dyn EventSink>,
    factory: SpiderFactory,
    current: Mutex<Option<RunHandle>>,
}

impl SpiderRunner {
    pub fn new(sink: Arc<dyn EventSink>, factory: SpiderFactory) -> Self {
        Self {
            sink,
            factory,
            current: Mutex::new(None),
        }
    }

    pub async fn handle(&self, message: ControlMessage) {
        match message {
            ControlMessage::Start { data } => self.start(data).await,
            ControlMessage::Stop => self.stop().await,
        }
    }

    /// Begin a run unless one is already live
    pub async fn start(&self, options: SpiderOptions) {
        let mut current = self.current.lock().await;
        if let Some(run) = current.as_ref() {
            if !run.task.is_finished() {
                warn!("Start ignored: a run is already in progress");
                self.sink.emit(Event::Log {
                    message: "Start ignored: a run is already in progress.".into(),
                    severity: LogSeverity::Warn,
                });
                return;
            }
        }

        let cancel = CancellationToken::new();
        let sink = Arc::clone(&self.sink);
        let factory = Arc::clone(&self.factory);
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut reporter = Reporter::new(Arc::clone(&sink));
            if let Some(path) = &options.findings_file {
                match FindingsStore::open(path) {
                    Ok(store) => reporter = reporter.with_store(store),
                    Err(err) => {
                        sink.emit(Event::Log {
                            message: format!("Findings file unavailable: {err}"),
                            severity: LogSeverity::Warn,
                        });
                    }
                }
            }
            let reporter = Arc::new(reporter);

            reporter.clear();
            reporter.status(SpiderStatus::Running);

            let result = async {
                let spider = factory(Arc::clone(&reporter), &options)?;
                let cx = SpiderCx::new(Arc::clone(&reporter), task_cancel, options);
                frontier::run(spider.as_ref(), &cx).await
            }
            .await;

            match result {
                Ok(outcome) => {
                    info!(outcome = ?outcome, "Run finished");
                }
                Err(err) => {
                    reporter.log(LogSeverity::Error, format!("Fatal error: {err}"));
                }
            }
            // The terminal status fires on every exit path
            reporter.status(SpiderStatus::Idle);
        });

        *current = Some(RunHandle { cancel, task });
    }

    /// Request cancellation of the live run, if any
    pub async fn stop(&self) {
        let current = self.current.lock().await;
        let Some(run) = current.as_ref() else {
            return;
        };
        if run.task.is_finished() {
            return;
        }
        run.cancel.cancel();
        self.sink.emit(Event::Log {
            message: "Stop requested.".into(),
            severity: LogSeverity::Action,
        });
        self.sink.emit(Event::Status(SpiderStatus::Stopped));
    }

    /// Wait for the live run to end
    pub async fn join(&self) {
        let run = self.current.lock().await.take();
        if let Some(run) = run {
            let _ = run.task.await;
        }
    }
}
