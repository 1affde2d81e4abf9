//! Analytics sink implementations.
//!
//! The api layer spawns `write` on a detached task; a sink failure is
//! logged and never reaches the response path.

use skillgate_core::trace::{AnalyticsSink, TraceSnapshot};
use skillgate_types::error::GatewayError;

/// Emits trace snapshots as structured tracing events.
///
/// Suitable for local development and log-pipeline ingestion; swap in an
/// HTTP sink for a hosted analytics backend.
#[derive(Default)]
pub struct TraceLogSink;

impl TraceLogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for TraceLogSink {
    async fn write(&self, snapshot: &TraceSnapshot) -> Result<(), GatewayError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| GatewayError::Internal(format!("trace serialization failed: {e}")))?;
        tracing::info!(
            target: "skillgate::analytics",
            trace_id = %snapshot.trace_id,
            duration_ms = snapshot.total_duration_ms,
            spans = snapshot.spans.len(),
            %payload,
            "trace exported"
        );
        Ok(())
    }
}
