//! Per-request trace capture.
//!
//! The outermost gateway middleware: opens the root span, threads the
//! [`TraceHandle`] through request extensions, closes the root on every
//! exit path (including panics converted downstream), stamps the
//! `X-Trace-ID` header, and hands the exported snapshot to the analytics
//! sink on a detached task so export latency never touches the response.

use std::collections::BTreeMap;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use skillgate_core::trace::{SpanStatus, TraceHandle};
use skillgate_observe::http_attrs;

use crate::state::AppState;

pub async fn trace_requests(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let trace = TraceHandle::new();

    let mut attributes = BTreeMap::new();
    attributes.insert(
        http_attrs::HTTP_REQUEST_METHOD.to_string(),
        request.method().to_string(),
    );
    attributes.insert(
        http_attrs::URL_PATH.to_string(),
        request.uri().path().to_string(),
    );
    attributes.insert(
        http_attrs::CLIENT_ADDRESS.to_string(),
        client_address(request.headers()),
    );
    if let Some(agent) = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
    {
        attributes.insert(http_attrs::USER_AGENT_ORIGINAL.to_string(), agent.to_string());
    }

    let root = trace.start_span("http.request", attributes);
    request.extensions_mut().insert(trace.clone());

    let mut response = next.run(request).await;

    let status = response.status().as_u16();
    let mut close_attrs = BTreeMap::new();
    close_attrs.insert(
        http_attrs::HTTP_RESPONSE_STATUS_CODE.to_string(),
        status.to_string(),
    );
    trace.add_event(root, "http.response", close_attrs);
    trace.end_span(
        root,
        if status >= 400 {
            SpanStatus::Error
        } else {
            SpanStatus::Ok
        },
    );
    trace.set_root_status(status);

    let snapshot = trace.export();
    if let Ok(value) = HeaderValue::from_str(&snapshot.trace_id.to_string()) {
        response.headers_mut().insert("x-trace-id", value);
    }

    // Fire-and-forget: an analytics failure must never affect the caller.
    let sink = state.analytics.clone();
    tokio::spawn(async move {
        if let Err(err) = sink.write(&snapshot).await {
            tracing::debug!(error = %err, "analytics export failed");
        }
    });

    response
}

/// First hop of `X-Forwarded-For`, or "unknown" when absent. The gateway
/// sits behind a load balancer, so the socket peer is not the caller.
fn client_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
