// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Event Stream
 * Typed outbound event sink for spider runs
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::types::Finding;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use tokio::sync::mpsc;

/// Log severity carried in the event stream's `extra` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warn,
    Error,
    Action,
    Http,
    Debug,
    Finding,
}

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpiderStatus {
    Running,
    Idle,
    Stopped,
}

/// Outbound event. Serializes to the `{type, data, extra?}` wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Log {
        message: String,
        severity: LogSeverity,
    },
    Progress(u64),
    Found(u64),
    Finding(Finding),
    Status(SpiderStatus),
    Clear,
}

impl Event {
    /// Wire representation consumed by the host UI
    pub fn to_wire(&self) -> Value {
        match self {
            Event::Log { message, severity } => json!({
                "type": "log",
                "data": message,
                "extra": severity,
            }),
            Event::Progress(n) => json!({ "type": "progress", "data": n }),
            Event::Found(n) => json!({ "type": "found", "data": n }),
            Event::Finding(f) => json!({ "type": "finding", "data": f }),
            Event::Status(s) => json!({ "type": "status", "data": s }),
            Event::Clear => json!({ "type": "clear" }),
        }
    }
}

/// Observer for everything a run emits. Implementations must be cheap;
/// the frontier calls this from its hot loop.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Sink that writes one JSON line per event to stdout
#[derive(Debug, Default)]
pub struct JsonLineSink;

impl EventSink for JsonLineSink {
    fn emit(&self, event: Event) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        // A broken pipe means the host is gone; nothing useful to do.
        let _ = writeln!(lock, "{}", event.to_wire());
        let _ = lock.flush();
    }
}

/// Sink backed by an unbounded channel, for embedding and tests
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

/// Sink that discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}
