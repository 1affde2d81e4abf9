//! Principal extractor for authenticated handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use skillgate_types::error::GatewayError;
use skillgate_types::principal::Principal;

use crate::http::error::AppError;
use crate::state::AppState;

/// The principal the auth gate bound to this request.
///
/// Rejects with 401 when absent, which only happens if a protected route
/// is somehow reached without passing the gate.
pub struct AuthPrincipal(pub Principal);

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthPrincipal)
            .ok_or_else(|| AppError::new(GatewayError::Unauthorized))
    }
}
