//! Trace handle extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use skillgate_core::trace::TraceHandle;

use crate::http::error::AppError;

/// The request's trace, as threaded through extensions by the trace
/// middleware. Falls back to a detached trace so handlers stay usable
/// when exercised without the middleware stack.
pub struct RequestTrace(pub TraceHandle);

impl<S: Send + Sync> FromRequestParts<S> for RequestTrace {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<TraceHandle>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}
