//! VerificationProvider trait definition.
//!
//! The abstraction over the external KYC provider. The trait is
//! object-safe (used as `Arc<dyn VerificationProvider>` in app state), so
//! it uses `async_trait` rather than RPITIT.
//!
//! Implementations live in skillgate-infra (e.g., `StripeIdentityProvider`).

use skillgate_types::error::ProviderError;
use skillgate_types::identity::{CreatedSession, ProfessionalDetails};

/// Everything the provider needs to open a document-verification session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Binds the provider session back to our principal's user.
    pub client_reference_id: String,
    pub email: String,
    pub full_name: String,
    /// BCP-47 locale for the hosted flow ("ar" or "en").
    pub locale: String,
    /// Document-type allowlist for this session.
    pub allowed_document_types: Vec<String>,
    pub require_live_capture: bool,
    pub require_matching_selfie: bool,
    /// Professional sessions use a stricter policy without address capture.
    pub capture_address: bool,
    /// License/specialty metadata for regulated-professional sessions.
    pub professional: Option<ProfessionalDetails>,
}

/// Trait for KYC provider backends.
///
/// Calls carry a timeout in the implementation; a timeout surfaces as a
/// transient [`ProviderError`], never an indefinite block.
#[async_trait::async_trait]
pub trait VerificationProvider: Send + Sync {
    /// Human-readable provider name (e.g., "stripe-identity").
    fn name(&self) -> &str;

    /// Open a new document-verification session with the provider.
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, ProviderError>;
}
