//! DashMap-backed usage counters.

use dashmap::DashMap;

use skillgate_core::ratelimit::{Usage, UsageStore};
use skillgate_types::error::GatewayError;

/// Thread-safe monthly usage counters keyed by `{api_key}:{window}`.
///
/// The DashMap entry API holds the shard lock for the whole
/// read-compare-increment, so concurrent callers on the same key serialize
/// and no update is ever lost.
#[derive(Default)]
pub struct MemoryUsageStore {
    counters: DashMap<String, u64>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl UsageStore for MemoryUsageStore {
    async fn increment_and_compare(&self, key: &str, limit: u64) -> Result<Usage, GatewayError> {
        let mut entry = self.counters.entry(key.to_string()).or_insert(0);
        if *entry <= limit {
            *entry += 1;
        }
        Ok(Usage {
            allowed: *entry <= limit,
            used: *entry,
        })
    }

    async fn current(&self, key: &str) -> Result<u64, GatewayError> {
        Ok(self.counters.get(key).map(|v| *v).unwrap_or(0))
    }
}
