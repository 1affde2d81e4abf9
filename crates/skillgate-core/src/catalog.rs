//! Read-only skills catalog.
//!
//! Backed entirely by the immutable [`CatalogConfig`] loaded at process
//! start; nothing here mutates at request time. Skill entries are
//! documented intents -- the gateway never executes them.

use skillgate_types::config::CatalogConfig;
use skillgate_types::catalog::{PricingPlan, Skill, SkillCategory};
use skillgate_types::error::GatewayError;
use skillgate_types::principal::Tier;

/// Serves catalog queries for the read-only endpoints.
pub struct CatalogService {
    catalog: CatalogConfig,
}

impl CatalogService {
    pub fn new(catalog: CatalogConfig) -> Self {
        Self { catalog }
    }

    /// All skills, optionally filtered by category id.
    pub fn list_skills(&self, category: Option<&str>) -> Vec<&Skill> {
        self.catalog
            .skills
            .iter()
            .filter(|s| category.is_none_or(|c| s.category == c))
            .collect()
    }

    pub fn get_skill(&self, id: &str) -> Result<&Skill, GatewayError> {
        self.catalog
            .skills
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("skill {id}")))
    }

    pub fn list_categories(&self) -> &[SkillCategory] {
        &self.catalog.categories
    }

    /// Pricing plans from config, or tier-derived defaults when none are
    /// configured so the public pricing endpoint is never empty.
    pub fn pricing_plans(&self) -> Vec<PricingPlan> {
        if !self.catalog.pricing.is_empty() {
            return self.catalog.pricing.clone();
        }
        [
            (Tier::Starter, 299),
            (Tier::Professional, 999),
            (Tier::Enterprise, 4999),
        ]
        .into_iter()
        .map(|(tier, price_sar)| PricingPlan {
            tier: tier.to_string(),
            price_sar,
            monthly_requests: tier.monthly_quota(),
            features: Vec::new(),
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogService {
        let config: CatalogConfig = toml::from_str(
            r#"
[[skills]]
id = "contract-review"
name = "Contract Review"
category = "legal"
description = "Reviews commercial contracts."

[[skills]]
id = "threat-scan"
name = "Threat Scan"
category = "cybersecurity"
description = "Scans infrastructure descriptions for risks."
requires_verification = true

[[categories]]
id = "legal"
name = "Legal"

[[categories]]
id = "cybersecurity"
name = "Cybersecurity"
"#,
        )
        .unwrap();
        CatalogService::new(config)
    }

    #[test]
    fn test_list_skills_unfiltered() {
        assert_eq!(catalog().list_skills(None).len(), 2);
    }

    #[test]
    fn test_list_skills_category_filter() {
        let service = catalog();
        let legal = service.list_skills(Some("legal"));
        assert_eq!(legal.len(), 1);
        assert_eq!(legal[0].id, "contract-review");
        assert!(service.list_skills(Some("healthcare")).is_empty());
    }

    #[test]
    fn test_get_skill_not_found() {
        assert!(matches!(
            catalog().get_skill("nonexistent").unwrap_err(),
            GatewayError::NotFound(_)
        ));
    }

    #[test]
    fn test_default_pricing_mirrors_tier_quotas() {
        let service = CatalogService::new(CatalogConfig::default());
        let plans = service.pricing_plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].monthly_requests, Some(10_000));
        assert_eq!(plans[2].monthly_requests, None);
    }
}
