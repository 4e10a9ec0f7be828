use std::{collections::BTreeMap, path::Path};

use {
    serde::Deserialize,
    tracing::{debug, warn},
};

use crate::types::UsagePolicy;

/// One explicit governance ruling for a catalog key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GovernanceEntry {
    #[serde(default)]
    pub usage_policy: UsagePolicy,
    #[serde(default)]
    pub note: Option<String>,
}

/// Default policies applied when no explicit entry matches, partitioned by
/// ownership category.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GovernanceDefaults {
    /// Default for skills owned by the configured organization.
    #[serde(default)]
    pub org: UsagePolicy,
    /// Default for community/public skills.
    #[serde(default)]
    pub community: UsagePolicy,
}

/// The usage-policy table (`config/governance.yaml`). Read-only input to
/// flattening; the catalog builder never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Governance {
    #[serde(default)]
    pub policies: BTreeMap<String, GovernanceEntry>,
    #[serde(default)]
    pub defaults: GovernanceDefaults,
}

impl Governance {
    /// Load the governance table, degrading to an empty table (everything
    /// defaults) when the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "no governance table");
                return Self::default();
            },
        };
        match serde_yaml::from_str(&raw) {
            Ok(table) => table,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed governance table, ignoring");
                Self::default()
            },
        }
    }

    /// Resolve the policy for a catalog key. Exact-match only: an explicit
    /// entry is used verbatim (policy and note); otherwise the category
    /// default applies and carries no note.
    pub fn resolve(&self, key: &str, org_owned: bool) -> (UsagePolicy, Option<String>) {
        if let Some(entry) = self.policies.get(key) {
            return (entry.usage_policy.clone(), entry.note.clone());
        }
        let default = if org_owned {
            &self.defaults.org
        } else {
            &self.defaults.community
        };
        (default.clone(), None)
    }
}
