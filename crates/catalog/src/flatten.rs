use std::collections::BTreeMap;

use crate::{
    governance::Governance,
    types::{Catalog, FlatCatalog, FlatSkill, split_repo_key},
};

/// Settings for the nested→flat projection.
#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    /// Organization identifier for the org-ownership flag.
    pub org: Option<String>,
    /// Excerpt length in characters.
    pub excerpt_len: usize,
    /// Carried through into the payload for the frontend's freshness badge.
    pub fresh_period_days: u32,
}

/// Project the nested catalog into the flattened, search-ready view.
///
/// One record per {repository, skill}; governance is resolved from the live
/// policy table at flatten time, independent of content-hash freshness.
/// Records are sorted by display name, case-insensitively ascending; name
/// collisions keep repository-then-skill-path iteration order (the sort is
/// stable). `bodies` maps fully-qualified keys to body text for excerpts.
pub fn flatten(
    catalog: &Catalog,
    governance: &Governance,
    bodies: &BTreeMap<String, String>,
    generated_at: &str,
    opts: &FlattenOptions,
) -> FlatCatalog {
    let mut skills = Vec::with_capacity(catalog.skill_count());

    for (repo_key, repo) in &catalog.repositories {
        let (platform, owner, repo_name) = match split_repo_key(repo_key) {
            Some(parts) => parts,
            None => {
                tracing::warn!(%repo_key, "skipping repository with malformed key");
                continue;
            },
        };
        let is_org_owned = opts.org.as_deref() == Some(owner);

        for (skill_path, entry) in &repo.skills {
            let key = format!("{repo_key}/{skill_path}");
            let (usage_policy, note) = governance.resolve(&key, is_org_owned);
            let body = bodies.get(&key).map(String::as_str).unwrap_or_default();

            skills.push(FlatSkill {
                key,
                repo_key: repo_key.clone(),
                skill_path: skill_path.clone(),
                platform: platform.to_string(),
                owner: owner.to_string(),
                repo: repo_name.to_string(),
                visibility: repo.visibility.clone(),
                is_org_owned,
                frontmatter: entry.frontmatter.clone(),
                files: entry.files.clone(),
                excerpt: body.chars().take(opts.excerpt_len).collect(),
                usage_policy,
                note,
                updated_at: entry.updated_at.clone(),
                registered_at: entry.registered_at.clone(),
                repo_sha: repo.repo_sha.clone(),
                tree_sha: entry.tree_sha.clone(),
                is_fork: repo.fork,
            });
        }
    }

    skills.sort_by_cached_key(|s| s.display_name().to_lowercase());

    FlatCatalog {
        generated_at: generated_at.to_string(),
        fresh_period_days: opts.fresh_period_days,
        skills,
    }
}
