//! Public endpoints: health, docs, pricing, and the identity policy.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::http::response;
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<Value> {
    response::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /docs - machine-readable endpoint listing.
pub async fn docs() -> Json<Value> {
    response::ok(json!({
        "name": "Skillgate API",
        "version": env!("CARGO_PKG_VERSION"),
        "authentication": "Authorization: Bearer sk_... on all non-public endpoints",
        "endpoints": [
            { "method": "GET",  "path": "/health",                         "public": true },
            { "method": "GET",  "path": "/docs",                           "public": true },
            { "method": "GET",  "path": "/api/pricing",                    "public": true },
            { "method": "GET",  "path": "/api/identity/config",            "public": true },
            { "method": "POST", "path": "/api/stripe/webhook",             "public": true },
            { "method": "GET",  "path": "/api/skills",                     "public": false },
            { "method": "GET",  "path": "/api/skills/{id}",                "public": false },
            { "method": "GET",  "path": "/api/categories",                 "public": false },
            { "method": "POST", "path": "/api/identity/verify",            "public": false },
            { "method": "GET",  "path": "/api/identity/verify/{sessionId}","public": false },
            { "method": "POST", "path": "/api/identity/validate/saudi-id", "public": false },
        ],
    }))
}

/// GET /api/pricing
pub async fn pricing(State(state): State<AppState>) -> Json<Value> {
    response::ok(json!({ "plans": state.catalog.pricing_plans() }))
}

/// GET /api/identity/config - the document policy in force, so clients can
/// shape their verification UI before opening a session.
pub async fn identity_config(State(state): State<AppState>) -> Json<Value> {
    let policy = state.identity.policy();
    response::ok(json!({
        "provider": "stripe-identity",
        "allowedDocumentTypes": policy.allowed_document_types,
        "requireLiveCapture": policy.require_live_capture,
        "requireMatchingSelfie": policy.require_matching_selfie,
    }))
}
