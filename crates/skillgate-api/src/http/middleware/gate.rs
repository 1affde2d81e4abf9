//! Authentication and quota gate.
//!
//! Runs inside the trace middleware on every non-public route: binds a
//! [`Principal`] from the bearer key, then counts the request against the
//! principal's monthly quota. Over-quota requests are rejected with 429
//! before any handler runs. Successful limited responses carry the
//! `X-RateLimit-*` headers.

use std::collections::BTreeMap;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use skillgate_core::ratelimit::RateLimitDecision;
use skillgate_core::trace::{SpanStatus, TraceHandle};
use skillgate_observe::http_attrs;
use skillgate_types::error::GatewayError;
use skillgate_types::principal::Principal;

use crate::http::error::{error_kind, AppError};
use crate::state::AppState;

/// Routes reachable without credentials.
pub const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/docs",
    "/api/pricing",
    "/api/identity/config",
    "/api/stripe/webhook",
];

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    // The trace middleware runs outside this gate; a fresh handle here
    // only happens when the gate is exercised in isolation.
    let trace = request
        .extensions()
        .get::<TraceHandle>()
        .cloned()
        .unwrap_or_default();

    let auth_span = trace.start_span("gate.auth", BTreeMap::new());
    let principal = match bearer_principal(request.headers()) {
        Ok(principal) => principal,
        Err(err) => {
            trace.set_error(auth_span, error_kind(&err), &err.to_string());
            trace.end_span(auth_span, SpanStatus::Error);
            return AppError::traced(err, trace.trace_id()).into_response();
        }
    };
    let mut bound = BTreeMap::new();
    bound.insert(
        http_attrs::API_KEY_PREFIX.to_string(),
        principal.key_prefix().to_string(),
    );
    bound.insert(
        http_attrs::PRINCIPAL_TIER.to_string(),
        principal.tier.to_string(),
    );
    trace.add_event(auth_span, "principal.bound", bound);
    trace.end_span(auth_span, SpanStatus::Ok);

    let limit_span = trace.start_span("gate.rate_limit", BTreeMap::new());
    let decision = match state.limiter.check(&principal, Utc::now()).await {
        Ok(decision) => decision,
        Err(err) => {
            trace.set_error(limit_span, error_kind(&err), &err.to_string());
            trace.end_span(limit_span, SpanStatus::Error);
            return AppError::traced(err, trace.trace_id()).into_response();
        }
    };
    trace.end_span(limit_span, SpanStatus::Ok);

    request.extensions_mut().insert(principal);
    let mut response = next.run(request).await;

    if let RateLimitDecision::Limited {
        limit,
        remaining,
        reset_at,
    } = decision
    {
        let headers = response.headers_mut();
        insert_header(headers, "x-ratelimit-limit", &limit.to_string());
        insert_header(headers, "x-ratelimit-remaining", &remaining.to_string());
        insert_header(headers, "x-ratelimit-reset", &reset_at.timestamp().to_string());
    }

    response
}

/// Extract and format-check the bearer key.
///
/// Missing or non-bearer credentials are `Unauthorized`; a present bearer
/// token failing the key format check is `InvalidKey`.
fn bearer_principal(headers: &HeaderMap) -> Result<Principal, GatewayError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(GatewayError::Unauthorized)?;
    let key = header
        .strip_prefix("Bearer ")
        .ok_or(GatewayError::Unauthorized)?
        .trim();
    if !Principal::key_format_is_valid(key) {
        return Err(GatewayError::InvalidKey);
    }
    Ok(Principal::from_key(key.to_string()))
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use skillgate_types::principal::Tier;

    use super::*;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_public_path_allowlist() {
        assert!(is_public("/health"));
        assert!(is_public("/api/stripe/webhook"));
        assert!(!is_public("/api/skills"));
        assert!(!is_public("/api/identity/verify"));
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let err = bearer_principal(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized));
    }

    #[test]
    fn test_non_bearer_scheme_is_unauthorized() {
        let err = bearer_principal(&headers_with_auth("Basic c2tfeA==")).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized));
    }

    #[test]
    fn test_bad_key_format_is_invalid_key() {
        let err = bearer_principal(&headers_with_auth("Bearer pk_live_x")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidKey));
    }

    #[test]
    fn test_valid_bearer_binds_principal() {
        let principal = bearer_principal(&headers_with_auth("Bearer sk_pro_abc")).unwrap();
        assert_eq!(principal.tier, Tier::Professional);
        assert_eq!(principal.api_key, "sk_pro_abc");
    }
}
