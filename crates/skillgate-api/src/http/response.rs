//! Success envelope for API responses.
//!
//! Every success payload carries a `timestamp` field alongside its own
//! keys; errors use the envelope in [`crate::http::error`].

use axum::Json;
use serde_json::Value;

/// Stamp a JSON object payload with the response timestamp.
pub fn ok(mut payload: Value) -> Json<Value> {
    if let Value::Object(map) = &mut payload {
        map.insert(
            "timestamp".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }
    Json(payload)
}
