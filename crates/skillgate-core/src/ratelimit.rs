//! Tier-scoped quota enforcement over a shared keyed store.
//!
//! The counter lives behind the [`UsageStore`] trait: `increment_and_compare`
//! must be atomic against shared state (a DashMap entry op in-process, a
//! scripted INCR against an external store), so concurrent requests on the
//! same key never double-count or lose updates and tracked usage never
//! passes limit + 1. This limiter really rejects over-quota calls with
//! 429; the headers are not advisory.

use chrono::{DateTime, Datelike, TimeZone, Utc};

use skillgate_types::error::GatewayError;
use skillgate_types::principal::Principal;

/// Result of one atomic increment-and-compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Whether this request fits within the limit.
    pub allowed: bool,
    /// The counter value after the operation.
    pub used: u64,
}

/// Atomic usage counter keyed by `{api_key}:{window}`.
#[async_trait::async_trait]
pub trait UsageStore: Send + Sync {
    /// Atomically increment the counter for `key` if it has not passed
    /// `limit`, and report whether the request is allowed.
    ///
    /// The counter must never grow beyond `limit + 1`, so redelivered
    /// over-quota traffic cannot inflate tracked usage.
    async fn increment_and_compare(&self, key: &str, limit: u64) -> Result<Usage, GatewayError>;

    /// Read the current value without incrementing (0 when absent).
    async fn current(&self, key: &str) -> Result<u64, GatewayError>;
}

/// Outcome of a rate-limit check, surfaced as response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Limited {
        limit: u64,
        remaining: u64,
        reset_at: DateTime<Utc>,
    },
    /// Enterprise keys are unbounded; no counter is consumed.
    Unlimited,
}

/// Enforces per-key monthly quotas derived from the principal's tier.
pub struct RateLimiter<S: UsageStore> {
    store: S,
}

impl<S: UsageStore> RateLimiter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Count this request against the principal's quota.
    pub async fn check(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, GatewayError> {
        let Some(limit) = principal.tier.monthly_quota() else {
            return Ok(RateLimitDecision::Unlimited);
        };

        let key = usage_key(&principal.api_key, now);
        let usage = self.store.increment_and_compare(&key, limit).await?;
        let reset_at = window_reset(now);

        if !usage.allowed {
            tracing::warn!(
                key_prefix = %principal.key_prefix(),
                tier = %principal.tier,
                limit,
                "rate limit exceeded"
            );
            return Err(GatewayError::RateLimitExceeded {
                limit,
                retry_after_secs: (reset_at - now).num_seconds().max(0) as u64,
            });
        }

        Ok(RateLimitDecision::Limited {
            limit,
            remaining: limit.saturating_sub(usage.used),
            reset_at,
        })
    }
}

/// Counter key for a key's current monthly window.
pub fn usage_key(api_key: &str, now: DateTime<Utc>) -> String {
    format!("{}:{:04}-{:02}", api_key, now.year(), now.month())
}

/// Start of the next monthly window, when counters reset.
pub fn window_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    // The 1st of a month always exists.
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
}
