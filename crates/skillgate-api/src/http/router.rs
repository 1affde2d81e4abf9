//! Axum router configuration with the gateway middleware chain.
//!
//! Layer order, outermost first: CORS, tower-http request logging, trace
//! capture, panic conversion, then the auth/rate-limit gate. The trace
//! middleware sits outside the panic layer so a panicked request still
//! exports its trace with the root span marked failed.

use std::any::Any;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as CorsAny, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::{handlers, middleware};
use crate::state::AppState;

/// Build the complete gateway router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(CorsAny)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny);

    Router::new()
        // Public surface
        .route("/health", get(handlers::meta::health))
        .route("/docs", get(handlers::meta::docs))
        .route("/api/pricing", get(handlers::meta::pricing))
        .route("/api/identity/config", get(handlers::meta::identity_config))
        .route("/api/stripe/webhook", post(handlers::webhook::stripe_webhook))
        // Catalog (authenticated)
        .route("/api/skills", get(handlers::catalog::list_skills))
        .route("/api/skills/{id}", get(handlers::catalog::get_skill))
        .route("/api/categories", get(handlers::catalog::list_categories))
        // Identity verification (authenticated)
        .route(
            "/api/identity/verify",
            post(handlers::identity::create_verification),
        )
        .route(
            "/api/identity/verify/{session_id}",
            get(handlers::identity::get_verification),
        )
        .route(
            "/api/identity/validate/saudi-id",
            post(handlers::identity::validate_saudi_id),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::auth_gate,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::trace::trace_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Convert a handler panic into the standard 500 envelope. A panic
/// escapes the request context, so the envelope carries no `traceId`;
/// the trace middleware outside this layer still sees the 500, marks the
/// root span failed, and stamps `X-Trace-ID` for correlation.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");

    let body = json!({
        "error": "INTERNAL_ERROR",
        "message": "Internal error",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
