//! Provider webhook endpoint.
//!
//! Public route, but nothing is processed until the signature verifies
//! against the shared secret. Unknown event types and unknown sessions
//! return 200 so the provider does not redeliver what the gateway cannot
//! act on.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use skillgate_core::identity::dispatcher::DispatchOutcome;
use skillgate_core::trace::SpanStatus;
use skillgate_infra::webhook::{self, WebhookError};
use skillgate_types::error::GatewayError;

use crate::http::error::{error_kind, AppError};
use crate::http::extractors::trace::RequestTrace;
use crate::http::response;
use crate::state::AppState;

/// POST /api/stripe/webhook
pub async fn stripe_webhook(
    State(state): State<AppState>,
    RequestTrace(trace): RequestTrace,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let span = trace.start_span("webhook.dispatch", BTreeMap::new());

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let event = match webhook::verify_and_parse(
        &body,
        signature,
        state.webhook_secret.expose_secret().as_bytes(),
        Utc::now(),
    ) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "webhook delivery rejected");
            let gateway_err = match err {
                WebhookError::MalformedPayload(msg) => {
                    GatewayError::Validation(format!("unparseable webhook payload: {msg}"))
                }
                _ => GatewayError::SignatureInvalid,
            };
            trace.set_error(span, error_kind(&gateway_err), &gateway_err.to_string());
            trace.end_span(span, SpanStatus::Error);
            return Err(AppError::traced(gateway_err, trace.trace_id()));
        }
    };

    let outcome = match state.dispatcher.dispatch(event).await {
        Ok(outcome) => outcome,
        Err(err) => {
            trace.set_error(span, error_kind(&err), &err.to_string());
            trace.end_span(span, SpanStatus::Error);
            return Err(AppError::traced(err, trace.trace_id()));
        }
    };

    let mut attrs = BTreeMap::new();
    attrs.insert("outcome".to_string(), outcome_label(&outcome).to_string());
    trace.add_event(span, "webhook.dispatched", attrs);
    trace.end_span(span, SpanStatus::Ok);

    Ok(response::ok(json!({
        "received": true,
        "outcome": outcome_label(&outcome),
    })))
}

fn outcome_label(outcome: &DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Applied { .. } => "applied",
        DispatchOutcome::NoOp { .. } => "no_op",
        DispatchOutcome::Unhandled { .. } => "unhandled",
    }
}
