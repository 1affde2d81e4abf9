//! End-to-end tests driving the full router in-process: public allowlist,
//! auth gate, quota enforcement, the verification session lifecycle, and
//! signed webhook dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use skillgate_api::http::router::build_router;
use skillgate_api::state::AppState;
use skillgate_core::identity::provider::{SessionRequest, VerificationProvider};
use skillgate_infra::webhook::sign_header;
use skillgate_types::config::GatewayConfig;
use skillgate_types::error::ProviderError;
use skillgate_types::identity::{CreatedSession, SessionStatus};

const WEBHOOK_SECRET: &[u8] = b"whsec_test_secret";

/// Deterministic provider stub: session id is `{client_reference_id}-session`.
struct StubProvider;

#[async_trait]
impl VerificationProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, ProviderError> {
        Ok(CreatedSession {
            session_id: format!("{}-session", request.client_reference_id),
            client_secret: "vs_secret_test".to_string(),
            redirect_url: "https://verify.example/session".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            status: SessionStatus::Created,
        })
    }
}

fn test_config() -> GatewayConfig {
    serde_json::from_value(json!({
        "catalog": {
            "skills": [
                {
                    "id": "contract-review",
                    "name": "Contract Review",
                    "category": "legal",
                    "description": "Reviews commercial contracts."
                },
                {
                    "id": "threat-scan",
                    "name": "Threat Scan",
                    "category": "cybersecurity",
                    "description": "Scans infrastructure descriptions for risks.",
                    "requires_verification": true
                }
            ],
            "categories": [
                { "id": "legal", "name": "Legal" },
                { "id": "cybersecurity", "name": "Cybersecurity" }
            ]
        }
    }))
    .expect("test config")
}

fn app() -> Router {
    let state = AppState::with_provider(
        test_config(),
        Arc::new(StubProvider),
        SecretString::from("whsec_test_secret"),
    );
    build_router(state)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed_get(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, key: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {key}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn signed_webhook(event: &Value) -> Request<Body> {
    let payload = serde_json::to_vec(event).unwrap();
    let signature = sign_header(WEBHOOK_SECRET, &payload, Utc::now().timestamp()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header("stripe-signature", signature)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap()
}

fn verified_event(session_id: &str) -> Value {
    json!({
        "type": "identity.verification_session.verified",
        "data": { "object": {
            "id": session_id,
            "verified_outputs": {
                "document_type": "id_card",
                "id_number": "1122334455",
                "issuing_country": "SA"
            }
        }}
    })
}

// ---------------------------------------------------------------------------
// Public surface and auth gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_is_public_and_traced() {
    let (status, headers, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    assert!(headers.contains_key("x-trace-id"));
}

#[tokio::test]
async fn test_pricing_is_public_with_default_plans() {
    let (status, _, body) = send(app(), get("/api/pricing")).await;
    assert_eq!(status, StatusCode::OK);
    let plans = body["plans"].as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["monthly_requests"], 10_000);
    assert_eq!(plans[2]["monthly_requests"], Value::Null);
}

#[tokio::test]
async fn test_identity_config_is_public() {
    let (status, _, body) = send(app(), get("/api/identity/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "stripe-identity");
    assert_eq!(body["requireLiveCapture"], true);
    assert!(body["allowedDocumentTypes"]
        .as_array()
        .unwrap()
        .contains(&json!("id_card")));
}

#[tokio::test]
async fn test_protected_route_requires_credentials() {
    let (status, headers, body) = send(app(), get("/api/skills")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert!(body["timestamp"].is_string());
    // The envelope trace id matches the response header.
    assert_eq!(body["traceId"], headers["x-trace-id"].to_str().unwrap());
}

#[tokio::test]
async fn test_malformed_key_is_rejected() {
    let (status, _, body) = send(app(), authed_get("/api/skills", "pk_live_x")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_API_KEY");
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_skills_listing_and_category_filter() {
    let router = app();
    let (status, _, body) = send(router.clone(), authed_get("/api/skills", "sk_test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, _, filtered) = send(
        router,
        authed_get("/api/skills?category=legal", "sk_test"),
    )
    .await;
    assert_eq!(filtered["total"], 1);
    assert_eq!(filtered["skills"][0]["id"], "contract-review");
}

#[tokio::test]
async fn test_unknown_skill_is_not_found() {
    let (status, _, body) = send(app(), authed_get("/api/skills/nope", "sk_test")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_categories_require_auth_and_list() {
    let router = app();
    let (status, _, _) = send(router.clone(), get("/api/categories")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = send(router, authed_get("/api/categories", "sk_test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_headers_decrement() {
    let router = app();
    let (_, headers, _) = send(router.clone(), authed_get("/api/categories", "sk_aaa")).await;
    assert_eq!(headers["x-ratelimit-limit"], "10000");
    assert_eq!(headers["x-ratelimit-remaining"], "9999");
    assert!(headers.contains_key("x-ratelimit-reset"));

    let (_, headers, _) = send(router, authed_get("/api/categories", "sk_aaa")).await;
    assert_eq!(headers["x-ratelimit-remaining"], "9998");
}

#[tokio::test]
async fn test_enterprise_key_is_uncounted() {
    let (status, headers, _) =
        send(app(), authed_get("/api/categories", "sk_ent_big")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!headers.contains_key("x-ratelimit-limit"));
    assert!(!headers.contains_key("x-ratelimit-remaining"));
}

#[tokio::test]
async fn test_starter_quota_exhaustion_returns_429() {
    let router = app();
    for _ in 0..10_000 {
        let response = router
            .clone()
            .oneshot(authed_get("/api/categories", "sk_quota"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (status, headers, body) =
        send(router.clone(), authed_get("/api/categories", "sk_quota")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
    assert!(headers.contains_key("retry-after"));
    assert_eq!(headers["x-ratelimit-remaining"], "0");

    // Redelivered over-quota traffic stays rejected.
    let (status, _, _) = send(router, authed_get("/api/categories", "sk_quota")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// Verification lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_verification_flow_end_to_end() {
    let router = app();

    let (status, _, created) = send(
        router.clone(),
        post_json(
            "/api/identity/verify",
            "sk_test",
            &json!({"userId": "u1", "email": "a@b.com", "fullName": "Test User"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["sessionId"], "u1-session");
    assert_eq!(created["clientSecret"], "vs_secret_test");
    assert_eq!(created["status"], "created");

    let (status, _, pending) = send(
        router.clone(),
        authed_get("/api/identity/verify/u1-session", "sk_test"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["status"], "created");
    assert_eq!(pending["identityVerified"], false);

    let (status, _, delivered) = send(
        router.clone(),
        signed_webhook(&verified_event("u1-session")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["received"], true);
    assert_eq!(delivered["outcome"], "applied");

    let (status, _, verified) = send(
        router,
        authed_get("/api/identity/verify/u1-session", "sk_test"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["status"], "verified");
    assert_eq!(verified["identityVerified"], true);
    assert_eq!(verified["document"]["idNumber"], "******4455");
    assert_eq!(verified["document"]["documentType"], "id_card");
    assert!(verified["verifiedAt"].is_string());
}

#[tokio::test]
async fn test_professional_flow_requires_license() {
    let router = app();
    let (status, _, body) = send(
        router.clone(),
        post_json(
            "/api/identity/verify",
            "sk_test",
            &json!({
                "userId": "p1", "email": "p@b.com", "fullName": "Pro User",
                "userType": "professional"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _, body) = send(
        router,
        post_json(
            "/api/identity/verify",
            "sk_test",
            &json!({
                "userId": "p1", "email": "p@b.com", "fullName": "Pro User",
                "userType": "professional", "licenseNumber": "SCFHS-12345",
                "specialty": "cardiology"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "p1-session");
}

#[tokio::test]
async fn test_missing_fields_are_validation_error() {
    let (status, _, body) = send(
        app(),
        post_json(
            "/api/identity/verify",
            "sk_test",
            &json!({"userId": "u1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_invalid_json_body_is_validation_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/identity/verify")
        .header(header::AUTHORIZATION, "Bearer sk_test")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (status, _, body) = send(
        app(),
        authed_get("/api/identity/verify/vs_missing", "sk_test"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_saudi_id_validation() {
    let router = app();
    let (status, _, body) = send(
        router.clone(),
        post_json(
            "/api/identity/validate/saudi-id",
            "sk_test",
            &json!({"idNumber": "1122334455"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], true);
    assert_eq!(body["idType"], "citizen");
    assert_eq!(body["maskedId"], "******4455");

    let (_, _, resident) = send(
        router.clone(),
        post_json(
            "/api/identity/validate/saudi-id",
            "sk_test",
            &json!({"idNumber": "2122334455"}),
        ),
    )
    .await;
    assert_eq!(resident["idType"], "resident");

    let (status, _, invalid) = send(
        router,
        post_json(
            "/api/identity/validate/saudi-id",
            "sk_test",
            &json!({"idNumber": "3122334455"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invalid["isValid"], false);
    assert_eq!(invalid["idType"], Value::Null);
}

#[tokio::test]
async fn test_saudi_id_multibyte_input_is_invalid_not_an_error() {
    let (status, _, body) = send(
        app(),
        post_json(
            "/api/identity/validate/saudi-id",
            "sk_test",
            &json!({"idNumber": "€€"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], false);
    assert_eq!(body["idType"], Value::Null);
    assert_eq!(body["maskedId"], "**");
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_webhook_missing_signature_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&verified_event("vs_1")).unwrap(),
        ))
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn test_webhook_bad_signature_is_rejected() {
    let payload = serde_json::to_vec(&verified_event("vs_1")).unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header(
            "stripe-signature",
            format!("t={},v1=deadbeef", Utc::now().timestamp()),
        )
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn test_bad_signature_event_mutates_nothing() {
    let router = app();
    send(
        router.clone(),
        post_json(
            "/api/identity/verify",
            "sk_test",
            &json!({"userId": "u3", "email": "a@b.com", "fullName": "Test User"}),
        ),
    )
    .await;

    // A verified event signed with the wrong secret must be rejected
    // before any session state is touched.
    let payload = serde_json::to_vec(&verified_event("u3-session")).unwrap();
    let signature =
        sign_header(b"whsec_wrong_secret", &payload, Utc::now().timestamp()).unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header("stripe-signature", signature)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap();
    let (status, _, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SIGNATURE");

    let (_, _, session) = send(
        router,
        authed_get("/api/identity/verify/u3-session", "sk_test"),
    )
    .await;
    assert_eq!(session["status"], "created");
    assert_eq!(session["identityVerified"], false);
}

#[tokio::test]
async fn test_webhook_unknown_event_type_is_accepted() {
    let event = json!({
        "type": "identity.verification_session.redacted",
        "data": { "object": { "id": "vs_1" } }
    });
    let (status, _, body) = send(app(), signed_webhook(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(body["outcome"], "unhandled");
}

#[tokio::test]
async fn test_webhook_unknown_session_is_accepted() {
    let (status, _, body) = send(app(), signed_webhook(&verified_event("vs_missing"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "no_op");
}

#[tokio::test]
async fn test_terminal_session_ignores_later_events() {
    let router = app();
    send(
        router.clone(),
        post_json(
            "/api/identity/verify",
            "sk_test",
            &json!({"userId": "u2", "email": "a@b.com", "fullName": "Test User"}),
        ),
    )
    .await;
    send(
        router.clone(),
        signed_webhook(&verified_event("u2-session")),
    )
    .await;

    let canceled = json!({
        "type": "identity.verification_session.canceled",
        "data": { "object": { "id": "u2-session" } }
    });
    let (status, _, body) = send(router.clone(), signed_webhook(&canceled)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "no_op");

    let (_, _, session) = send(
        router,
        authed_get("/api/identity/verify/u2-session", "sk_test"),
    )
    .await;
    assert_eq!(session["status"], "verified");
}
