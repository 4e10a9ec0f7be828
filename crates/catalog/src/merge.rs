use std::collections::BTreeMap;

use crate::types::{Catalog, DiscoveredSkill, FreshRepository, RepositoryEntry, SkillEntry};

/// Merge freshly discovered repositories with the previously persisted
/// catalog.
///
/// Content fields (frontmatter, file lists) always come from fresh
/// discovery; operational fields the discovery pass cannot regenerate
/// (registration timestamps, content hashes, first-collected time) are
/// preserved from prior state. Repositories present in the prior catalog
/// but absent from `fresh` are left untouched — a run that never visited a
/// repository must not delete it.
///
/// Pure value-in/value-out: `now` is the single timestamp for the whole
/// run, so merging the same input twice yields the same output.
pub fn merge_catalogs(
    fresh: &BTreeMap<String, FreshRepository>,
    prior: &Catalog,
    now: &str,
) -> Catalog {
    let mut merged = prior.clone();

    for (repo_key, fresh_repo) in fresh {
        let prior_repo = prior.repositories.get(repo_key);
        merged
            .repositories
            .insert(repo_key.clone(), merge_repository(fresh_repo, prior_repo, now));
    }

    merged
}

fn merge_repository(
    fresh: &FreshRepository,
    prior: Option<&RepositoryEntry>,
    now: &str,
) -> RepositoryEntry {
    // Visibility is fresh-authoritative; local discovery doesn't know it,
    // so fall back to the persisted value, then to public.
    let visibility = fresh
        .visibility
        .clone()
        .or_else(|| prior.map(|r| r.visibility.clone()))
        .unwrap_or_else(|| "public".to_string());

    let repo_sha = fresh
        .repo_sha
        .clone()
        .or_else(|| prior.and_then(|r| r.repo_sha.clone()));

    let fork = fresh.fork.unwrap_or_else(|| prior.is_some_and(|r| r.fork));

    // First-collected time is immutable once set.
    let collected_at = prior
        .and_then(|r| r.collected_at.clone())
        .or_else(|| fresh.collected_at.clone());

    // Only skills present in fresh discovery survive: a re-scanned
    // repository drops paths that no longer exist.
    let skills = fresh
        .skills
        .iter()
        .map(|(skill_path, discovered)| {
            let prior_skill = prior.and_then(|r| r.skills.get(skill_path));
            (
                skill_path.clone(),
                merge_skill(discovered, prior_skill, now),
            )
        })
        .collect();

    RepositoryEntry {
        visibility,
        repo_sha,
        fork,
        collected_at,
        skills,
    }
}

fn merge_skill(fresh: &DiscoveredSkill, prior: Option<&SkillEntry>, now: &str) -> SkillEntry {
    match (&fresh.tree_sha, prior) {
        // Hash unchanged: the prior entry wins verbatim, frontmatter and
        // timestamps included, even if the fresh pass parsed different text.
        (Some(sha), Some(p)) if p.tree_sha.as_deref() == Some(sha.as_str()) => p.clone(),

        // Hash present and changed (or first sighting): rebuild the entry.
        // registered_at is immutable once set; updated_at marks this run.
        (Some(sha), prior) => SkillEntry {
            tree_sha: Some(sha.clone()),
            updated_at: Some(now.to_string()),
            registered_at: prior
                .and_then(|p| p.registered_at.clone())
                .or_else(|| Some(now.to_string())),
            frontmatter: fresh.frontmatter.clone(),
            files: fresh.files.clone(),
        },

        // No hash (local walk) with prior state: content fields are
        // refreshed, operational fields carried through unchanged so a
        // rebuild over unchanged files is idempotent.
        (None, Some(p)) => SkillEntry {
            tree_sha: p.tree_sha.clone(),
            updated_at: p.updated_at.clone(),
            registered_at: p.registered_at.clone(),
            frontmatter: fresh.frontmatter.clone(),
            files: fresh.files.clone(),
        },

        // Brand new skill with no hash: register it now.
        (None, None) => SkillEntry {
            tree_sha: None,
            updated_at: Some(now.to_string()),
            registered_at: Some(now.to_string()),
            frontmatter: fresh.frontmatter.clone(),
            files: fresh.files.clone(),
        },
    }
}
