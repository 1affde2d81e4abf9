//! Identity-verification session service.
//!
//! Opens document-verification sessions with the external KYC provider and
//! records them in the session store. Performs no internal retries:
//! session creation is not guaranteed safely repeatable without an
//! explicit idempotency key, so retry policy is left to the caller.

use std::sync::Arc;

use skillgate_types::config::ProviderConfig;
use skillgate_types::error::GatewayError;
use skillgate_types::identity::{CreatedSession, ProfessionalDetails, VerificationSession};

use super::provider::{SessionRequest, VerificationProvider};
use super::store::SessionStore;

/// Default hosted-flow locale for the Saudi market.
const DEFAULT_LOCALE: &str = "ar";

/// Caller input for opening a verification session.
#[derive(Debug, Clone)]
pub struct NewSessionInput {
    /// The principal's user id; becomes the provider `client_reference_id`.
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    /// Hosted-flow language ("ar" or "en"); defaults to Arabic.
    pub language: Option<String>,
}

impl NewSessionInput {
    /// Reject blank required fields before any provider call.
    fn validate(&self) -> Result<(), GatewayError> {
        let mut missing = Vec::new();
        if self.user_id.trim().is_empty() {
            missing.push("userId");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.full_name.trim().is_empty() {
            missing.push("fullName");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Creates and retrieves KYC verification sessions.
pub struct IdentityVerificationService {
    provider: Arc<dyn VerificationProvider>,
    sessions: Arc<dyn SessionStore>,
    policy: ProviderConfig,
}

impl IdentityVerificationService {
    pub fn new(
        provider: Arc<dyn VerificationProvider>,
        sessions: Arc<dyn SessionStore>,
        policy: ProviderConfig,
    ) -> Self {
        Self {
            provider,
            sessions,
            policy,
        }
    }

    /// The document policy currently in force (for the public config endpoint).
    pub fn policy(&self) -> &ProviderConfig {
        &self.policy
    }

    /// Open a standard document-verification session.
    pub async fn create_session(
        &self,
        input: NewSessionInput,
    ) -> Result<CreatedSession, GatewayError> {
        input.validate()?;
        let request = self.base_request(&input, true, None);
        self.open_with_provider(request).await
    }

    /// Open a regulated-professional session: license/specialty metadata is
    /// attached and the document policy is stricter (no address capture).
    pub async fn create_professional_session(
        &self,
        input: NewSessionInput,
        license_number: String,
        specialty: Option<String>,
    ) -> Result<CreatedSession, GatewayError> {
        input.validate()?;
        if license_number.trim().is_empty() {
            return Err(GatewayError::Validation(
                "missing required fields: licenseNumber".to_string(),
            ));
        }
        let professional = ProfessionalDetails {
            license_number,
            specialty,
        };
        let request = self.base_request(&input, false, Some(professional));
        self.open_with_provider(request).await
    }

    /// Current state of a session, from the session store.
    pub async fn get_session(
        &self,
        session_id: &str,
    ) -> Result<VerificationSession, GatewayError> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("verification session {session_id}")))
    }

    fn base_request(
        &self,
        input: &NewSessionInput,
        capture_address: bool,
        professional: Option<ProfessionalDetails>,
    ) -> SessionRequest {
        SessionRequest {
            client_reference_id: input.user_id.clone(),
            email: input.email.clone(),
            full_name: input.full_name.clone(),
            locale: input
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            allowed_document_types: self.policy.allowed_document_types.clone(),
            require_live_capture: self.policy.require_live_capture,
            require_matching_selfie: self.policy.require_matching_selfie,
            capture_address,
            professional,
        }
    }

    async fn open_with_provider(
        &self,
        request: SessionRequest,
    ) -> Result<CreatedSession, GatewayError> {
        let created = self.provider.create_session(&request).await?;

        let mut session = VerificationSession::new(
            created.session_id.clone(),
            request.client_reference_id.clone(),
        );
        session.status = created.status;
        session.professional = request.professional;
        self.sessions.put(session).await?;

        tracing::info!(
            provider = %self.provider.name(),
            session_id = %created.session_id,
            client_reference_id = %request.client_reference_id,
            "verification session opened"
        );
        Ok(created)
    }
}
