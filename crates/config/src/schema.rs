use serde::{Deserialize, Serialize};

/// Operator configuration (`config/admin.yaml`). All fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Settings for the remote collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Skip forked repositories when listing the organization.
    #[serde(default)]
    pub exclude_forks: bool,
}

/// Settings for the catalog builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Organization identifier used for the org-ownership flag.
    /// Usually detected from `GH_ORG` or the git remote instead.
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub skill: SkillConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Days a skill counts as "fresh" in the frontend; 0 disables the badge.
    #[serde(default)]
    pub fresh_period_days: u32,
    /// Excerpt length (characters) in the flattened catalog.
    #[serde(default = "default_excerpt_len")]
    pub excerpt_len: usize,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            fresh_period_days: 0,
            excerpt_len: default_excerpt_len(),
        }
    }
}

fn default_excerpt_len() -> usize {
    300
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: AdminConfig = serde_yaml::from_str("{}").unwrap();
        assert!(!cfg.collector.exclude_forks);
        assert_eq!(cfg.catalog.skill.fresh_period_days, 0);
        assert_eq!(cfg.catalog.skill.excerpt_len, 300);
        assert!(cfg.catalog.org.is_none());
    }

    #[test]
    fn partial_document_fills_rest() {
        let cfg: AdminConfig = serde_yaml::from_str(
            "collector:\n  exclude_forks: true\ncatalog:\n  skill:\n    fresh_period_days: 14\n",
        )
        .unwrap();
        assert!(cfg.collector.exclude_forks);
        assert_eq!(cfg.catalog.skill.fresh_period_days, 14);
        assert_eq!(cfg.catalog.skill.excerpt_len, 300);
    }

    #[test]
    fn org_is_read_when_present() {
        let cfg: AdminConfig = serde_yaml::from_str("catalog:\n  org: acme\n").unwrap();
        assert_eq!(cfg.catalog.org.as_deref(), Some("acme"));
    }
}
