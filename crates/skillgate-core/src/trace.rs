//! Per-request span tree and analytics export.
//!
//! A [`TraceContext`] is created when a request arrives and discarded after
//! export -- purely request-scoped, never persisted. The api middleware
//! opens the root span, threads a [`TraceHandle`] through request
//! extensions (an explicit context object, no globals), closes the root on
//! every exit path, and hands the exported [`TraceSnapshot`] to an
//! [`AnalyticsSink`] on a detached task.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use skillgate_types::error::GatewayError;

/// Span outcome. Root status mirrors the final response: >= 400 is Error.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanStatus {
    Ok,
    Error,
}

/// A point-in-time annotation on a span.
#[derive(Debug, Clone, Serialize)]
pub struct SpanEvent {
    pub name: String,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// One (sub)operation of a request.
#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub span_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub started_at: DateTime<Utc>,
    /// Set on close; export closes any span still open.
    pub ended_at: Option<DateTime<Utc>>,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SpanEvent>,
    pub status: SpanStatus,
}

/// Opaque reference to a span inside its owning trace.
///
/// Indices are stable because spans are only ever appended; span order in
/// the export is creation order.
#[derive(Debug, Clone, Copy)]
pub struct SpanHandle(usize);

/// Immutable export of a completed trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceSnapshot {
    pub trace_id: Uuid,
    pub total_duration_ms: u64,
    pub spans: Vec<Span>,
}

/// The span tree for one in-flight request.
#[derive(Debug)]
pub struct TraceContext {
    trace_id: Uuid,
    started: Instant,
    spans: Vec<Span>,
    /// Stack of open span indices; the top is the parent of the next span.
    open: Vec<usize>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::now_v7(),
            started: Instant::now(),
            spans: Vec::new(),
            open: Vec::new(),
        }
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    /// Open a span. The parent is the innermost span still open, so
    /// nesting is strict: a parent starts before and ends after all of
    /// its children.
    pub fn start_span(
        &mut self,
        name: &str,
        attributes: BTreeMap<String, String>,
    ) -> SpanHandle {
        let parent_id = self.open.last().map(|&i| self.spans[i].span_id);
        let index = self.spans.len();
        self.spans.push(Span {
            span_id: Uuid::now_v7(),
            parent_id,
            name: name.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            attributes,
            events: Vec::new(),
            status: SpanStatus::Ok,
        });
        self.open.push(index);
        SpanHandle(index)
    }

    /// Close a span with the given status. Closing an already-closed span
    /// keeps its original end time.
    pub fn end_span(&mut self, handle: SpanHandle, status: SpanStatus) {
        let span = &mut self.spans[handle.0];
        if span.ended_at.is_none() {
            span.ended_at = Some(Utc::now());
            span.status = status;
        }
        self.open.retain(|&i| i != handle.0);
    }

    pub fn add_event(
        &mut self,
        handle: SpanHandle,
        name: &str,
        attributes: BTreeMap<String, String>,
    ) {
        self.spans[handle.0].events.push(SpanEvent {
            name: name.to_string(),
            at: Utc::now(),
            attributes,
        });
    }

    /// Mark a span as failed, recording the error type and message as
    /// attributes. Does not close the span.
    pub fn set_error(&mut self, handle: SpanHandle, kind: &str, message: &str) {
        let span = &mut self.spans[handle.0];
        span.status = SpanStatus::Error;
        span.attributes
            .insert("error.type".to_string(), kind.to_string());
        span.attributes
            .insert("error.message".to_string(), message.to_string());
    }

    /// Force the root span's status from the final HTTP response code.
    pub fn set_root_status(&mut self, http_status: u16) {
        if let Some(root) = self.spans.first_mut() {
            root.status = if http_status >= 400 {
                SpanStatus::Error
            } else {
                SpanStatus::Ok
            };
        }
    }

    /// Produce the immutable snapshot, closing any span still open.
    pub fn export(&mut self) -> TraceSnapshot {
        let now = Utc::now();
        for span in &mut self.spans {
            if span.ended_at.is_none() {
                span.ended_at = Some(now);
            }
        }
        self.open.clear();
        TraceSnapshot {
            trace_id: self.trace_id,
            total_duration_ms: self.started.elapsed().as_millis() as u64,
            spans: self.spans.clone(),
        }
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap clonable handle threading one request's trace through the call
/// chain. Requests are single-threaded, so the mutex is uncontended; it
/// exists only to satisfy `Send + Sync` for axum extensions.
#[derive(Debug, Clone)]
pub struct TraceHandle(Arc<Mutex<TraceContext>>);

impl TraceHandle {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(TraceContext::new())))
    }

    pub fn trace_id(&self) -> Uuid {
        self.lock().trace_id()
    }

    pub fn start_span(&self, name: &str, attributes: BTreeMap<String, String>) -> SpanHandle {
        self.lock().start_span(name, attributes)
    }

    pub fn end_span(&self, handle: SpanHandle, status: SpanStatus) {
        self.lock().end_span(handle, status)
    }

    pub fn add_event(&self, handle: SpanHandle, name: &str, attributes: BTreeMap<String, String>) {
        self.lock().add_event(handle, name, attributes)
    }

    pub fn set_error(&self, handle: SpanHandle, kind: &str, message: &str) {
        self.lock().set_error(handle, kind, message)
    }

    pub fn set_root_status(&self, http_status: u16) {
        self.lock().set_root_status(http_status)
    }

    pub fn export(&self) -> TraceSnapshot {
        self.lock().export()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TraceContext> {
        // A poisoned trace mutex means a panic mid-request; the trace is
        // still worth exporting, so recover the guard.
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TraceHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for exported trace snapshots.
///
/// Writes are fire-and-forget: the api layer spawns them on a detached
/// task and a failure must never affect the response path.
#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn write(&self, snapshot: &TraceSnapshot) -> Result<(), GatewayError>;
}
