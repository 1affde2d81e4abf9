//! OpenTelemetry HTTP Semantic Convention attribute constants.
//!
//! These follow the OTel HTTP semantic conventions so request spans carry
//! consistent attribute names across the codebase. All constants are
//! string slices usable as span attribute keys.

/// HTTP request method ("GET", "POST", ...).
pub const HTTP_REQUEST_METHOD: &str = "http.request.method";

/// Request path as routed.
pub const URL_PATH: &str = "url.path";

/// Final response status code.
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";

/// Caller user agent.
pub const USER_AGENT_ORIGINAL: &str = "user_agent.original";

/// Client address as seen by the gateway.
pub const CLIENT_ADDRESS: &str = "client.address";

/// Short opaque API key prefix. Never the full key.
pub const API_KEY_PREFIX: &str = "skillgate.api_key_prefix";

/// Subscription tier of the bound principal.
pub const PRINCIPAL_TIER: &str = "skillgate.tier";
