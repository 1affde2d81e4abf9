//! Identity-verification domain types.
//!
//! Defines the verification session state machine data, the disclosed
//! document attributes returned by the KYC provider, and the webhook
//! event tagged union the dispatcher consumes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

/// Verification session status.
///
/// State machine: `Created -> RequiresInput <-> Processing -> {Verified | Canceled}`.
/// `Verified` and `Canceled` are terminal and immutable once reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    RequiresInput,
    Processing,
    Verified,
    Canceled,
}

impl SessionStatus {
    /// Terminal states ignore all further webhook events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Verified | SessionStatus::Canceled)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Created => write!(f, "created"),
            SessionStatus::RequiresInput => write!(f, "requires_input"),
            SessionStatus::Processing => write!(f, "processing"),
            SessionStatus::Verified => write!(f, "verified"),
            SessionStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// Document attributes disclosed by the provider once a session verifies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DisclosedDocument {
    /// Document type (e.g., "id_card", "passport").
    #[serde(default)]
    pub document_type: Option<String>,
    /// The document's id number. Masked before it reaches any client.
    #[serde(default)]
    pub id_number: Option<String>,
    /// Document expiry, as reported by the provider.
    #[serde(default)]
    pub expiration_date: Option<String>,
    /// Issuing authority or country.
    #[serde(default)]
    pub issuing_country: Option<String>,
}

impl DisclosedDocument {
    /// Mask the id number to its last four characters for API responses.
    ///
    /// Counts characters, not bytes; the provider does not guarantee an
    /// ASCII id number.
    pub fn masked_id_number(&self) -> Option<String> {
        self.id_number.as_ref().map(|id| {
            let total = id.chars().count();
            if total > 4 {
                let tail: String = id.chars().skip(total - 4).collect();
                format!("{}{}", "*".repeat(total - 4), tail)
            } else {
                "*".repeat(total)
            }
        })
    }
}

/// Regulated-professional metadata attached to professional sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalDetails {
    /// Professional license number (e.g., SCFHS registration).
    pub license_number: String,
    /// Declared specialty.
    #[serde(default)]
    pub specialty: Option<String>,
}

/// The reason a session bounced back to `RequiresInput`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A stateful record tracking one user's document KYC check.
///
/// Created only via the authenticated creation call; mutated only by the
/// webhook dispatcher after signature verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSession {
    /// Provider-issued session id.
    pub session_id: String,
    /// Caller-supplied reference binding the session to a principal's user.
    pub client_reference_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error: Option<SessionError>,
    /// Disclosed document attributes, populated when verified.
    #[serde(default)]
    pub document: Option<DisclosedDocument>,
    /// Present for regulated-professional sessions.
    #[serde(default)]
    pub professional: Option<ProfessionalDetails>,
    pub created_at: DateTime<Utc>,
}

impl VerificationSession {
    pub fn new(session_id: String, client_reference_id: String) -> Self {
        Self {
            session_id,
            client_reference_id,
            status: SessionStatus::Created,
            document_type: None,
            verified_at: None,
            last_error: None,
            document: None,
            professional: None,
            created_at: Utc::now(),
        }
    }
}

/// What the provider hands back when a session is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
    /// Short-lived secret the client uses to mount the provider's flow.
    pub client_secret: String,
    /// Hosted verification URL the user is redirected to.
    pub redirect_url: String,
    pub expires_at: DateTime<Utc>,
    pub status: SessionStatus,
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

/// A verification-state change reported by the provider.
///
/// Modeled as an exhaustive tagged union; unrecognized event types land in
/// `Unknown` and are logged but never treated as errors, so new provider
/// event types cannot break the webhook endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    SessionVerified {
        session_id: String,
        document: Option<DisclosedDocument>,
    },
    SessionRequiresInput {
        session_id: String,
        error: Option<SessionError>,
    },
    SessionCanceled {
        session_id: String,
    },
    Unknown {
        event_type: String,
    },
}

impl WebhookEvent {
    /// The session this event is bound to, if any.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            WebhookEvent::SessionVerified { session_id, .. }
            | WebhookEvent::SessionRequiresInput { session_id, .. }
            | WebhookEvent::SessionCanceled { session_id } => Some(session_id),
            WebhookEvent::Unknown { .. } => None,
        }
    }
}

/// Raw webhook envelope as delivered by the provider.
///
/// `{ "type": "identity.verification_session.verified", "data": { "object": {...} } }`
#[derive(Debug, Deserialize)]
pub struct RawWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: RawEventData,
}

#[derive(Debug, Deserialize)]
pub struct RawEventData {
    /// Unrecognized event types may carry an arbitrary object; defaults
    /// keep them parseable so they can be skipped instead of rejected.
    #[serde(default)]
    pub object: RawSessionObject,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSessionObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub last_error: Option<SessionError>,
    #[serde(default)]
    pub verified_outputs: Option<DisclosedDocument>,
}

impl RawWebhookEvent {
    /// Classify the raw event into the tagged union.
    pub fn into_event(self) -> WebhookEvent {
        let session_id = self.data.object.id;
        match self.event_type.as_str() {
            "identity.verification_session.verified" => WebhookEvent::SessionVerified {
                session_id,
                document: self.data.object.verified_outputs,
            },
            "identity.verification_session.requires_input" => WebhookEvent::SessionRequiresInput {
                session_id,
                error: self.data.object.last_error,
            },
            "identity.verification_session.canceled" => {
                WebhookEvent::SessionCanceled { session_id }
            }
            _ => WebhookEvent::Unknown {
                event_type: self.event_type,
            },
        }
    }
}
