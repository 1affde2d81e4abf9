//! DashMap-backed verification session store.

use dashmap::DashMap;

use skillgate_core::identity::store::SessionStore;
use skillgate_types::error::GatewayError;
use skillgate_types::identity::VerificationSession;

/// Thread-safe session store keyed by provider session id.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, VerificationSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session: VerificationSession) -> Result<(), GatewayError> {
        self.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<VerificationSession>, GatewayError> {
        Ok(self.sessions.get(session_id).map(|s| s.value().clone()))
    }
}
