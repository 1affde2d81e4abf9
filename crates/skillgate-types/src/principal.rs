//! Authenticated caller identity and subscription tiers.
//!
//! A [`Principal`] is derived per request from the `Authorization: Bearer`
//! header and bound into request extensions by the auth gate. It is never
//! persisted; usage counters live in the external keyed store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recognized prefix for all Skillgate API keys.
pub const API_KEY_PREFIX: &str = "sk_";

/// Subscription tier bounding quota and feature access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Starter,
    Professional,
    Enterprise,
}

impl Tier {
    /// Monthly request quota for this tier. `None` means unbounded.
    pub fn monthly_quota(&self) -> Option<u64> {
        match self {
            Tier::Starter => Some(10_000),
            Tier::Professional => Some(100_000),
            Tier::Enterprise => None,
        }
    }

    /// Derive the tier from an API key's prefix.
    ///
    /// Keys are issued as `sk_ent_...` (enterprise), `sk_pro_...`
    /// (professional), or plain `sk_...` (starter).
    pub fn from_api_key(key: &str) -> Self {
        if key.starts_with("sk_ent_") {
            Tier::Enterprise
        } else if key.starts_with("sk_pro_") {
            Tier::Professional
        } else {
            Tier::Starter
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Starter => write!(f, "starter"),
            Tier::Professional => write!(f, "professional"),
            Tier::Enterprise => write!(f, "enterprise"),
        }
    }
}

/// The authenticated caller bound to a request by the auth gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// The full API key. Never log this; use [`Principal::key_prefix`].
    pub api_key: String,
    /// Subscription tier derived from the key prefix.
    pub tier: Tier,
}

impl Principal {
    /// Build a principal from a key that already passed the format check.
    pub fn from_key(api_key: String) -> Self {
        let tier = Tier::from_api_key(&api_key);
        Self { api_key, tier }
    }

    /// Short opaque prefix safe for logs and trace attributes.
    ///
    /// At most the first 8 characters of the key; the rest is never
    /// recorded anywhere.
    pub fn key_prefix(&self) -> &str {
        let end = self.api_key.len().min(8);
        &self.api_key[..end]
    }

    /// Minimal key format check: non-empty and carrying the recognized
    /// prefix. This is a syntactic gate, not key validation.
    pub fn key_format_is_valid(key: &str) -> bool {
        !key.is_empty() && key.starts_with(API_KEY_PREFIX)
    }
}
