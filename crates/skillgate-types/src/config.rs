//! Gateway configuration types.
//!
//! `GatewayConfig` represents the top-level `config.toml`: server binding,
//! KYC provider settings, document policy, and the static catalog data.
//! Loaded once at startup and never mutated at request time.

use serde::{Deserialize, Serialize};

use crate::catalog::{PricingPlan, Skill, SkillCategory};

/// Top-level configuration for the gateway.
///
/// All fields have defaults so the gateway starts without a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// External KYC provider settings and document policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API base URL. Overridable for tests and proxies.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Per-call timeout. On expiry the call is a transient provider error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Document-type allowlist for standard sessions.
    #[serde(default = "default_document_types")]
    pub allowed_document_types: Vec<String>,
    /// Liveness requirement (the user must present a live capture).
    #[serde(default = "default_true")]
    pub require_live_capture: bool,
    /// Selfie must match the document photo.
    #[serde(default = "default_true")]
    pub require_matching_selfie: bool,
}

fn default_provider_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_document_types() -> Vec<String> {
    vec!["id_card".to_string(), "passport".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            timeout_secs: default_timeout_secs(),
            allowed_document_types: default_document_types(),
            require_live_capture: true,
            require_matching_selfie: true,
        }
    }
}

/// Static catalog content served by the read-only endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub categories: Vec<SkillCategory>,
    #[serde(default)]
    pub pricing: Vec<PricingPlan>,
}
