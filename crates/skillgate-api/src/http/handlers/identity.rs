//! Identity-verification endpoints: session creation and status, plus the
//! local resident-identifier format check.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use skillgate_core::identity::{saudi_id, NewSessionInput};
use skillgate_core::trace::{SpanStatus, TraceHandle};
use skillgate_observe::http_attrs;
use skillgate_types::error::GatewayError;
use skillgate_types::identity::SessionStatus;

use crate::http::error::{error_kind, AppError};
use crate::http::extractors::auth::AuthPrincipal;
use crate::http::extractors::trace::RequestTrace;
use crate::http::response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    /// "professional" routes to the stricter regulated-professional flow.
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// POST /api/identity/verify
pub async fn create_verification(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    RequestTrace(trace): RequestTrace,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request: VerifyRequest = parse_body(&body, &trace)?;

    let input = NewSessionInput {
        user_id: request.user_id,
        email: request.email,
        full_name: request.full_name,
        language: request.language,
    };

    let mut attrs = BTreeMap::new();
    attrs.insert(
        http_attrs::API_KEY_PREFIX.to_string(),
        principal.key_prefix().to_string(),
    );
    let span = trace.start_span("identity.create_session", attrs);

    let result = if request.user_type.as_deref() == Some("professional") {
        state
            .identity
            .create_professional_session(
                input,
                request.license_number.unwrap_or_default(),
                request.specialty,
            )
            .await
    } else {
        state.identity.create_session(input).await
    };

    let created = match result {
        Ok(created) => {
            trace.end_span(span, SpanStatus::Ok);
            created
        }
        Err(err) => {
            trace.set_error(span, error_kind(&err), &err.to_string());
            trace.end_span(span, SpanStatus::Error);
            return Err(AppError::traced(err, trace.trace_id()));
        }
    };

    Ok(response::ok(json!({
        "sessionId": created.session_id,
        "clientSecret": created.client_secret,
        "url": created.redirect_url,
        "expiresAt": created.expires_at,
        "status": created.status,
    })))
}

/// GET /api/identity/verify/{session_id}
pub async fn get_verification(
    State(state): State<AppState>,
    _principal: AuthPrincipal,
    RequestTrace(trace): RequestTrace,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .identity
        .get_session(&session_id)
        .await
        .map_err(|err| AppError::traced(err, trace.trace_id()))?;

    // Disclosed document attributes are masked before leaving the gateway.
    let document = session.document.as_ref().map(|doc| {
        json!({
            "documentType": doc.document_type,
            "idNumber": doc.masked_id_number(),
            "expirationDate": doc.expiration_date,
            "issuingCountry": doc.issuing_country,
        })
    });

    Ok(response::ok(json!({
        "sessionId": session.session_id,
        "status": session.status,
        "identityVerified": session.status == SessionStatus::Verified,
        "verifiedAt": session.verified_at,
        "document": document,
        "lastError": session.last_error,
        "professional": session.professional.is_some(),
        "createdAt": session.created_at,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaudiIdRequest {
    #[serde(default)]
    pub id_number: String,
}

/// POST /api/identity/validate/saudi-id - pure format check; always 200
/// for a well-formed request, with validity in the body.
pub async fn validate_saudi_id(
    _principal: AuthPrincipal,
    RequestTrace(trace): RequestTrace,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request: SaudiIdRequest = parse_body(&body, &trace)?;
    let kind = saudi_id::validate(&request.id_number);

    Ok(response::ok(json!({
        "isValid": kind.is_some(),
        "idType": kind.map(|k| k.to_string()),
        "maskedId": saudi_id::mask(&request.id_number),
    })))
}

/// Parse a JSON request body, mapping failures into the validation error
/// envelope instead of axum's default rejection.
fn parse_body<T: serde::de::DeserializeOwned>(
    body: &Bytes,
    trace: &TraceHandle,
) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        AppError::traced(
            GatewayError::Validation(format!("invalid request body: {err}")),
            trace.trace_id(),
        )
    })
}
