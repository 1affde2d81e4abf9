use thiserror::Error;

/// Gateway-wide error taxonomy.
///
/// Every failure that can reach an HTTP client maps onto one of these
/// variants; the api crate converts them to status codes and the standard
/// error envelope.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing or malformed bearer credentials")]
    Unauthorized,

    #[error("api key failed format check")]
    InvalidKey,

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded {
        limit: u64,
        retry_after_secs: u64,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("webhook signature verification failed")]
    SignatureInvalid,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors returned by the external KYC provider boundary.
///
/// Raw provider response bodies never cross this boundary; only the
/// provider's error code and a sanitized message survive.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("provider call timed out")]
    Timeout,

    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned an unparseable response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Timeouts and transport failures are transient; the caller may retry
    /// on a later request. Rejections and malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Timeout | ProviderError::Transport(_))
    }
}
