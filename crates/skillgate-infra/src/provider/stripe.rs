//! StripeIdentityProvider -- concrete [`VerificationProvider`] for the
//! Stripe Identity API.
//!
//! Opens document-verification sessions via
//! `POST /v1/identity/verification_sessions` (form-encoded, bearer auth).
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output. Every call carries a timeout; on expiry
//! the call is classified as a transient provider error.

use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use skillgate_core::identity::provider::{SessionRequest, VerificationProvider};
use skillgate_types::error::ProviderError;
use skillgate_types::identity::{CreatedSession, SessionStatus};

/// How long the hosted-flow client secret stays usable.
const SESSION_VALIDITY_SECS: i64 = 3600;

/// Stripe Identity KYC provider.
pub struct StripeIdentityProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

/// Session object returned by the verification-sessions endpoint.
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    client_secret: String,
    url: Option<String>,
    status: String,
}

/// Error envelope Stripe wraps around failures.
#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StripeIdentityProvider {
    /// Create a provider client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret key wrapped in SecretString
    /// * `timeout` - per-call timeout; expiry is a transient error
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: "https://api.stripe.com".to_string(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Flatten a [`SessionRequest`] into Stripe's form-encoded parameter list.
fn session_form(request: &SessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("type".to_string(), "document".to_string()),
        (
            "client_reference_id".to_string(),
            request.client_reference_id.clone(),
        ),
        ("metadata[email]".to_string(), request.email.clone()),
        ("metadata[full_name]".to_string(), request.full_name.clone()),
        ("metadata[locale]".to_string(), request.locale.clone()),
        (
            "options[document][require_live_capture]".to_string(),
            request.require_live_capture.to_string(),
        ),
        (
            "options[document][require_matching_selfie]".to_string(),
            request.require_matching_selfie.to_string(),
        ),
        (
            "options[document][require_id_number]".to_string(),
            "true".to_string(),
        ),
    ];
    for doc_type in &request.allowed_document_types {
        form.push((
            "options[document][allowed_types][]".to_string(),
            doc_type.clone(),
        ));
    }
    if !request.capture_address {
        // Stricter professional policy: address is never captured.
        form.push((
            "options[document][require_address]".to_string(),
            "false".to_string(),
        ));
    }
    if let Some(professional) = &request.professional {
        form.push((
            "metadata[license_number]".to_string(),
            professional.license_number.clone(),
        ));
        if let Some(specialty) = &professional.specialty {
            form.push(("metadata[specialty]".to_string(), specialty.clone()));
        }
    }
    form
}

/// Map a Stripe session status string onto the local state machine.
fn map_status(status: &str) -> SessionStatus {
    match status {
        "requires_input" => SessionStatus::RequiresInput,
        "processing" => SessionStatus::Processing,
        "verified" => SessionStatus::Verified,
        "canceled" => SessionStatus::Canceled,
        _ => SessionStatus::Created,
    }
}

/// Classify a reqwest failure. Timeouts are transient.
fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(err.to_string())
    }
}

#[async_trait::async_trait]
impl VerificationProvider for StripeIdentityProvider {
    fn name(&self) -> &str {
        "stripe-identity"
    }

    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, ProviderError> {
        let response = self
            .client
            .post(self.url("/v1/identity/verification_sessions"))
            .bearer_auth(self.api_key.expose_secret())
            .form(&session_form(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            // Surface only the provider's code and message; the raw body
            // stays on this side of the boundary.
            let envelope: Result<StripeErrorEnvelope, _> = serde_json::from_str(&body);
            return Err(match envelope {
                Ok(e) => ProviderError::Rejected {
                    code: e.error.code.unwrap_or_else(|| status.as_u16().to_string()),
                    message: e
                        .error
                        .message
                        .unwrap_or_else(|| "provider rejected the request".to_string()),
                },
                Err(_) => ProviderError::Malformed(format!(
                    "non-success status {} with unparseable body",
                    status.as_u16()
                )),
            });
        }

        let session: StripeSession =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(CreatedSession {
            session_id: session.id,
            client_secret: session.client_secret,
            redirect_url: session.url.unwrap_or_default(),
            expires_at: Utc::now() + chrono::Duration::seconds(SESSION_VALIDITY_SECS),
            status: map_status(&session.status),
        })
    }
}
