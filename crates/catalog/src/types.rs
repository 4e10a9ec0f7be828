use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Open string-keyed frontmatter mapping. Downstream consumers must treat
/// absent keys as unknown, never as an error.
pub type Frontmatter = BTreeMap<String, serde_json::Value>;

// ── Nested catalog (authoritative, persisted as catalog.yaml) ───────────────

/// The persisted nested catalog. `BTreeMap` keys keep serialization order
/// stable across runs so version-control diffs stay minimal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryEntry>,
}

impl Catalog {
    /// Total number of skills across all repositories.
    pub fn skill_count(&self) -> usize {
        self.repositories.values().map(|r| r.skills.len()).sum()
    }
}

/// One source repository, keyed by `<platform>/<owner>/<repo>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    /// Visibility classification (public/private/internal). Fresh discovery
    /// is authoritative; it can change between scans.
    pub visibility: String,
    /// Head commit of the default branch at last collection. Equal hash on
    /// the next run skips the whole repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_sha: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fork: bool,
    /// First time the collector saw this repository. Immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillEntry>,
}

/// One discovered skill document within a repository, keyed by the
/// root-relative path of its SKILL.md.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    /// Content hash of the skill's bundle directory. `None` means freshness
    /// cannot be determined and the skill is always re-processed. Serialized
    /// as an explicit null to keep the persisted shape stable.
    #[serde(default)]
    pub tree_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// First registration time. Never overwritten by a later merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
    #[serde(default)]
    pub frontmatter: Frontmatter,
    /// Sorted root-relative paths of every file in the bundle.
    #[serde(default)]
    pub files: Vec<String>,
}

fn is_false(v: &bool) -> bool {
    !v
}

/// Split a repository key into (platform, owner, repo).
pub fn split_repo_key(key: &str) -> Option<(&str, &str, &str)> {
    let mut parts = key.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(platform), Some(owner), Some(repo))
            if !platform.is_empty() && !owner.is_empty() && !repo.is_empty() =>
        {
            Some((platform, owner, repo))
        },
        _ => None,
    }
}

// ── Fresh discovery (input to the merge engine, never persisted) ────────────

/// A skill as produced by one discovery pass (local walk or remote tree).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredSkill {
    /// Bundle directory hash when the source reports one (remote trees);
    /// `None` for local walks.
    pub tree_sha: Option<String>,
    pub frontmatter: Frontmatter,
    pub files: Vec<String>,
    /// Markdown body below the frontmatter, used for excerpts and body
    /// artifacts. Not persisted in the nested catalog.
    pub body: String,
}

/// Everything one discovery pass knows about a repository. Fields the pass
/// cannot independently determine stay `None` and the merge engine falls
/// back to the previously persisted value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreshRepository {
    pub visibility: Option<String>,
    pub repo_sha: Option<String>,
    pub fork: Option<bool>,
    pub collected_at: Option<String>,
    pub skills: BTreeMap<String, DiscoveredSkill>,
}

// ── Governance ──────────────────────────────────────────────────────────────

/// Usage-policy label attached to a skill. Unrecognized labels are carried
/// through opaquely so newer policy vocabularies don't break older builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsagePolicy {
    Recommended,
    Discouraged,
    Prohibited,
    Required,
    #[default]
    None,
    Other(String),
}

impl UsagePolicy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Recommended => "recommended",
            Self::Discouraged => "discouraged",
            Self::Prohibited => "prohibited",
            Self::Required => "required",
            Self::None => "none",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for UsagePolicy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "recommended" => Self::Recommended,
            "discouraged" => Self::Discouraged,
            "prohibited" => Self::Prohibited,
            "required" => Self::Required,
            "none" => Self::None,
            _ => Self::Other(s),
        }
    }
}

impl From<UsagePolicy> for String {
    fn from(p: UsagePolicy) -> Self {
        p.as_str().to_string()
    }
}

// ── Flattened catalog (derived projection) ──────────────────────────────────

/// One denormalized record per {repository, skill}: every field needed to
/// render, filter, and search a skill without consulting its parent entry.
/// Field names match the JSON contract of the web frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatSkill {
    /// Fully-qualified key: `<repo key>/<skill path>`.
    pub key: String,
    #[serde(rename = "repoKey")]
    pub repo_key: String,
    #[serde(rename = "skillPath")]
    pub skill_path: String,
    pub platform: String,
    pub owner: String,
    pub repo: String,
    pub visibility: String,
    #[serde(rename = "isOrgOwned")]
    pub is_org_owned: bool,
    pub frontmatter: Frontmatter,
    pub files: Vec<String>,
    pub excerpt: String,
    pub usage_policy: UsagePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_sha: Option<String>,
    #[serde(default)]
    pub tree_sha: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fork: bool,
}

impl FlatSkill {
    /// Display name used for catalog ordering: the declared frontmatter
    /// `name` when present, else the fully-qualified key.
    pub fn display_name(&self) -> &str {
        self.frontmatter
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.key)
    }
}

/// Top-level flattened catalog payload (`catalog.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatCatalog {
    pub generated_at: String,
    pub fresh_period_days: u32,
    pub skills: Vec<FlatSkill>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_repo_key_valid() {
        assert_eq!(
            split_repo_key("github.com/acme/skills"),
            Some(("github.com", "acme", "skills"))
        );
    }

    #[test]
    fn split_repo_key_invalid() {
        assert_eq!(split_repo_key("acme/skills"), None);
        assert_eq!(split_repo_key(""), None);
        assert_eq!(split_repo_key("github.com//skills"), None);
    }

    #[test]
    fn usage_policy_roundtrip() {
        let p: UsagePolicy = serde_yaml::from_str("recommended").unwrap();
        assert_eq!(p, UsagePolicy::Recommended);
        assert_eq!(serde_yaml::to_string(&p).unwrap().trim(), "recommended");
    }

    #[test]
    fn usage_policy_unknown_label_passes_through() {
        let p: UsagePolicy = serde_yaml::from_str("experimental").unwrap();
        assert_eq!(p, UsagePolicy::Other("experimental".into()));
        assert_eq!(serde_yaml::to_string(&p).unwrap().trim(), "experimental");
    }

    #[test]
    fn skill_entry_serializes_null_tree_sha() {
        let yaml = serde_yaml::to_string(&SkillEntry::default()).unwrap();
        assert!(yaml.contains("tree_sha: null"));
        // Absent timestamps are omitted entirely.
        assert!(!yaml.contains("updated_at"));
        assert!(!yaml.contains("registered_at"));
    }

    #[test]
    fn repository_entry_omits_false_fork() {
        let entry = RepositoryEntry {
            visibility: "public".into(),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert!(!yaml.contains("fork"));

        let forked = RepositoryEntry {
            visibility: "public".into(),
            fork: true,
            ..Default::default()
        };
        assert!(serde_yaml::to_string(&forked).unwrap().contains("fork: true"));
    }

    #[test]
    fn display_name_falls_back_to_key() {
        let mut fm = Frontmatter::new();
        fm.insert("name".into(), serde_json::json!("Foo"));
        let skill = FlatSkill {
            key: "github.com/a/b/SKILL.md".into(),
            repo_key: "github.com/a/b".into(),
            skill_path: "SKILL.md".into(),
            platform: "github.com".into(),
            owner: "a".into(),
            repo: "b".into(),
            visibility: "public".into(),
            is_org_owned: false,
            frontmatter: fm,
            files: vec![],
            excerpt: String::new(),
            usage_policy: UsagePolicy::None,
            note: None,
            updated_at: None,
            registered_at: None,
            repo_sha: None,
            tree_sha: None,
            is_fork: false,
        };
        assert_eq!(skill.display_name(), "Foo");

        let mut unnamed = skill.clone();
        unnamed.frontmatter.clear();
        assert_eq!(unnamed.display_name(), "github.com/a/b/SKILL.md");
    }
}
