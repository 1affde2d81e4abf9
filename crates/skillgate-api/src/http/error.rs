//! Application error type mapping to HTTP status codes and the error
//! envelope: `{ "error": CODE, "message": ..., "timestamp": ..., "traceId": ... }`.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use skillgate_types::error::GatewayError;

/// A gateway error bound to the request that produced it.
///
/// The trace id is attached where the request trace is in scope, so error
/// envelopes can be correlated with exported traces.
#[derive(Debug)]
pub struct AppError {
    error: GatewayError,
    trace_id: Option<Uuid>,
}

impl AppError {
    pub fn new(error: GatewayError) -> Self {
        Self {
            error,
            trace_id: None,
        }
    }

    pub fn traced(error: GatewayError, trace_id: Uuid) -> Self {
        Self {
            error,
            trace_id: Some(trace_id),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(error: GatewayError) -> Self {
        Self::new(error)
    }
}

/// Short error classification for trace attributes.
pub fn error_kind(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::Validation(_) => "validation",
        GatewayError::Unauthorized => "unauthorized",
        GatewayError::InvalidKey => "invalid_key",
        GatewayError::RateLimitExceeded { .. } => "rate_limit",
        GatewayError::NotFound(_) => "not_found",
        GatewayError::SignatureInvalid => "signature",
        GatewayError::Provider(_) => "provider",
        GatewayError::Internal(_) => "internal",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.error {
            GatewayError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            GatewayError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or malformed bearer credentials".to_string(),
            ),
            GatewayError::InvalidKey => (
                StatusCode::UNAUTHORIZED,
                "INVALID_API_KEY",
                "API key failed format check".to_string(),
            ),
            GatewayError::RateLimitExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                "Monthly request quota exhausted".to_string(),
            ),
            GatewayError::NotFound(what) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{what} not found"))
            }
            GatewayError::SignatureInvalid => (
                StatusCode::BAD_REQUEST,
                "INVALID_SIGNATURE",
                "Webhook signature verification failed".to_string(),
            ),
            GatewayError::Provider(e) => {
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.to_string())
            }
            GatewayError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error".to_string(),
            ),
        };

        let mut body = json!({
            "error": code,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let (Some(trace_id), Some(map)) = (self.trace_id, body.as_object_mut()) {
            map.insert("traceId".to_string(), json!(trace_id.to_string()));
        }

        let mut response =
            (status, axum::Json(body)).into_response();

        if let GatewayError::RateLimitExceeded {
            limit,
            retry_after_secs,
        } = &self.error
        {
            let reset = chrono::Utc::now().timestamp() + *retry_after_secs as i64;
            let headers = response.headers_mut();
            insert_numeric(headers, "retry-after", *retry_after_secs);
            insert_numeric(headers, "x-ratelimit-limit", *limit);
            insert_numeric(headers, "x-ratelimit-remaining", 0);
            insert_numeric(headers, "x-ratelimit-reset", reset as u64);
        }

        response
    }
}

fn insert_numeric(headers: &mut axum::http::HeaderMap, name: &'static str, value: u64) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}
