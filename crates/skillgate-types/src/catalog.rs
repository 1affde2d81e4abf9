//! Skills catalog domain types.
//!
//! The catalog is static data loaded at process start; these types carry
//! it through the read-only endpoints. Skill descriptions are documented
//! intents only -- nothing here is ever executed.

use serde::{Deserialize, Serialize};

/// One entry in the skills catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Stable catalog identifier (e.g., "contract-review").
    pub id: String,
    pub name: String,
    /// Arabic display name, when available.
    #[serde(default)]
    pub name_ar: Option<String>,
    pub category: String,
    pub description: String,
    /// Minimum tier required to invoke the skill.
    #[serde(default = "default_min_tier")]
    pub min_tier: String,
    /// Whether the skill requires a verified identity session.
    #[serde(default)]
    pub requires_verification: bool,
}

fn default_min_tier() -> String {
    "starter".to_string()
}

/// A grouping of catalog skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One subscription plan row for the public pricing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPlan {
    pub tier: String,
    /// Monthly price in SAR.
    pub price_sar: u64,
    /// Monthly request quota; `null` means unbounded.
    pub monthly_requests: Option<u64>,
    #[serde(default)]
    pub features: Vec<String>,
}
