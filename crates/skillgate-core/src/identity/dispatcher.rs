//! Applies verified webhook events to session state.
//!
//! Every transition is set-to-value, so redelivered events are safe to
//! apply more than once, and the provider guarantees no cross-event
//! ordering: a transition attempted on a session already in a terminal
//! state is a no-op.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use skillgate_types::error::GatewayError;
use skillgate_types::identity::{SessionStatus, VerificationSession, WebhookEvent};

use super::store::SessionStore;

/// What the dispatcher did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The session moved to the given status.
    Applied { session_id: String, status: SessionStatus },
    /// Nothing changed (terminal session, redelivery, or unknown session).
    NoOp { reason: String },
    /// Forward-compatible skip of an unrecognized event type.
    Unhandled { event_type: String },
}

/// Pure transition function. Returns the new status when the event changed
/// the session, `None` when it was a no-op.
pub fn transition(
    session: &mut VerificationSession,
    event: &WebhookEvent,
    now: DateTime<Utc>,
) -> Option<SessionStatus> {
    if session.status.is_terminal() {
        return None;
    }
    match event {
        WebhookEvent::SessionVerified { document, .. } => {
            session.status = SessionStatus::Verified;
            session.verified_at = Some(now);
            session.document = document.clone();
            session.document_type = document
                .as_ref()
                .and_then(|d| d.document_type.clone());
            session.last_error = None;
            Some(SessionStatus::Verified)
        }
        WebhookEvent::SessionRequiresInput { error, .. } => {
            session.status = SessionStatus::RequiresInput;
            session.last_error = error.clone();
            Some(SessionStatus::RequiresInput)
        }
        WebhookEvent::SessionCanceled { .. } => {
            session.status = SessionStatus::Canceled;
            Some(SessionStatus::Canceled)
        }
        WebhookEvent::Unknown { .. } => None,
    }
}

/// Routes signature-verified provider events to the session store.
pub struct WebhookDispatcher {
    sessions: Arc<dyn SessionStore>,
}

impl WebhookDispatcher {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Apply one event. Never fails on unknown event types or unknown
    /// sessions -- the provider redelivers on non-2xx, and neither case
    /// is actionable.
    pub async fn dispatch(&self, event: WebhookEvent) -> Result<DispatchOutcome, GatewayError> {
        let session_id = match &event {
            WebhookEvent::Unknown { event_type } => {
                tracing::info!(event_type = %event_type, "ignoring unrecognized webhook event type");
                return Ok(DispatchOutcome::Unhandled {
                    event_type: event_type.clone(),
                });
            }
            WebhookEvent::SessionVerified { session_id, .. }
            | WebhookEvent::SessionRequiresInput { session_id, .. }
            | WebhookEvent::SessionCanceled { session_id } => session_id.clone(),
        };

        let Some(mut session) = self.sessions.get(&session_id).await? else {
            tracing::warn!(session_id = %session_id, "webhook event for unknown session");
            return Ok(DispatchOutcome::NoOp {
                reason: format!("unknown session {session_id}"),
            });
        };

        let Some(status) = transition(&mut session, &event, Utc::now()) else {
            tracing::info!(
                session_id = %session_id,
                status = %session.status,
                "webhook event is a no-op"
            );
            return Ok(DispatchOutcome::NoOp {
                reason: format!("session {session_id} already {}", session.status),
            });
        };

        self.sessions.put(session).await?;

        match status {
            SessionStatus::Verified => {
                // Downstream notification is an external collaborator;
                // the log line is its integration point.
                tracing::info!(session_id = %session_id, "session verified, notifying collaborator");
            }
            SessionStatus::RequiresInput => {
                tracing::info!(session_id = %session_id, "session requires input, notifying user for retry");
            }
            _ => {}
        }

        Ok(DispatchOutcome::Applied { session_id, status })
    }
}
