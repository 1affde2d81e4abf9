//! SessionStore trait definition.
//!
//! Verification sessions live in a shared keyed store so that webhook
//! deliveries (which arrive on separate requests) see the sessions opened
//! by creation calls. The in-process DashMap implementation lives in
//! skillgate-infra.

use skillgate_types::error::GatewayError;
use skillgate_types::identity::VerificationSession;

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace a session keyed by its session id.
    async fn put(&self, session: VerificationSession) -> Result<(), GatewayError>;

    /// Fetch a session by id.
    async fn get(&self, session_id: &str) -> Result<Option<VerificationSession>, GatewayError>;
}
