use std::{collections::BTreeMap, path::Path};

use {
    anyhow::Context,
    skilldeck_catalog::{
        CatalogStore, DiscoveredSkill, FreshRepository, RepositoryEntry, merge_catalogs,
        parse,
        types::Frontmatter,
    },
    skilldeck_config::{AdminConfig, Paths},
    skilldeck_github::{OrgRepo, RepoHost},
    tracing::{error, info, warn},
};

use crate::tree::{self, RemoteSkill};

/// Platform segment used for repository keys and the on-disk mirror.
pub const PLATFORM: &str = "github.com";

/// Counters for one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub repos_listed: usize,
    pub collected_skills: usize,
    /// Repositories whose head SHA matched the catalog and were not read.
    pub skipped_repos: usize,
    /// Skills whose bundle tree SHA matched the catalog and were not fetched.
    pub skipped_skills: usize,
    /// Repositories that failed mid-collection; their prior catalog state is
    /// left untouched.
    pub errored_repos: usize,
}

/// Collect every skill in an organization into the local mirror and merge
/// the result into the persisted catalog.
///
/// `now` is the single timestamp for the whole run. Repositories fail
/// independently: one broken repository never aborts the run, and a
/// repository that errors before producing fresh state keeps whatever the
/// catalog already recorded about it.
pub async fn collect(
    host: &dyn RepoHost,
    org: &str,
    paths: &Paths,
    admin: &AdminConfig,
    now: &str,
) -> anyhow::Result<RunSummary> {
    let store = CatalogStore::new(paths.catalog_path());
    let prior = store.load();

    host.pace().await?;
    let mut repos = host.list_org_repos(org).await?;
    if admin.collector.exclude_forks {
        repos.retain(|r| !r.fork);
    }
    info!(org, count = repos.len(), "listed repositories");

    let mut summary = RunSummary {
        repos_listed: repos.len(),
        ..RunSummary::default()
    };
    let mut fresh = BTreeMap::new();

    for repo in &repos {
        let repo_key = format!("{PLATFORM}/{org}/{}", repo.name);
        let prior_repo = prior.repositories.get(&repo_key);
        match collect_repo(host, org, repo, prior_repo, paths, now, &mut summary).await {
            Ok(Some(fresh_repo)) => {
                fresh.insert(repo_key, fresh_repo);
            },
            // Skipped outright or no skills found.
            Ok(None) => {},
            Err(err) => {
                error!(repo = %repo.name, %err, "repository failed; keeping its prior state");
                summary.errored_repos += 1;
            },
        }
    }

    let merged = merge_catalogs(&fresh, &prior, now);
    store.save(&merged)?;
    info!(
        collected = summary.collected_skills,
        skipped_repos = summary.skipped_repos,
        skipped_skills = summary.skipped_skills,
        errored = summary.errored_repos,
        "collection finished"
    );
    Ok(summary)
}

async fn collect_repo(
    host: &dyn RepoHost,
    org: &str,
    repo: &OrgRepo,
    prior: Option<&RepositoryEntry>,
    paths: &Paths,
    now: &str,
    summary: &mut RunSummary,
) -> anyhow::Result<Option<FreshRepository>> {
    host.pace().await?;
    let head_sha = host
        .branch_head_sha(org, &repo.name, &repo.default_branch)
        .await?;

    if prior.is_some_and(|p| p.repo_sha.as_deref() == Some(head_sha.as_str())) {
        info!(repo = %repo.name, "head unchanged, skipping repository");
        summary.skipped_repos += 1;
        return Ok(None);
    }

    host.pace().await?;
    let listing = host.get_tree(org, &repo.name, &head_sha).await?;
    let skills = if listing.truncated {
        warn!(repo = %repo.name, "tree listing truncated, probing conventional paths");
        tree::discover_skills_fallback(host, org, &repo.name).await
    } else {
        tree::discover_skills_from_tree(&listing.entries)
    };
    if skills.is_empty() {
        return Ok(None);
    }

    let repo_dir = paths.skills_dir().join(PLATFORM).join(org).join(&repo.name);
    let mut fresh_skills = BTreeMap::new();

    for skill in skills {
        let prior_skill = prior.and_then(|p| p.skills.get(&skill.skill_path));
        let unchanged =
            skill.tree_sha.is_some() && prior_skill.is_some_and(|p| p.tree_sha == skill.tree_sha);
        if unchanged {
            info!(repo = %repo.name, skill = %skill.skill_path, "bundle unchanged, not re-fetching");
            summary.skipped_skills += 1;
            // The matching hash makes the merge carry the prior entry
            // verbatim; no content needs to travel.
            fresh_skills.insert(skill.skill_path.clone(), DiscoveredSkill {
                tree_sha: skill.tree_sha.clone(),
                ..DiscoveredSkill::default()
            });
            continue;
        }

        let discovered = download_skill(host, org, &repo.name, &skill, &repo_dir).await;
        summary.collected_skills += 1;
        fresh_skills.insert(skill.skill_path.clone(), discovered);
    }

    Ok(Some(FreshRepository {
        visibility: Some(repo.visibility.clone()),
        repo_sha: Some(head_sha),
        fork: Some(repo.fork),
        collected_at: Some(now.to_string()),
        skills: fresh_skills,
    }))
}

/// Fetch a skill's bundle files into the local mirror. Individual files
/// fail independently: a file that cannot be fetched or written is dropped
/// from the bundle and the rest of the skill is kept.
async fn download_skill(
    host: &dyn RepoHost,
    owner: &str,
    repo: &str,
    skill: &RemoteSkill,
    repo_dir: &Path,
) -> DiscoveredSkill {
    let source_url = source_url(owner, repo, skill);
    let mut frontmatter = Frontmatter::new();
    let mut body = String::new();
    let mut files = Vec::with_capacity(skill.files.len());

    for file_path in &skill.files {
        let mut content = match host.fetch_file(owner, repo, file_path).await {
            Ok(content) => content,
            Err(err) => {
                error!(%owner, %repo, file = %file_path, %err, "fetch failed, dropping file from bundle");
                continue;
            },
        };

        if file_path == &skill.skill_path {
            match parse::parse_document(&content) {
                Ok(doc) => {
                    frontmatter = doc.frontmatter;
                    body = doc.body;
                },
                Err(err) => {
                    warn!(%owner, %repo, file = %file_path, %err, "unparseable SKILL.md, keeping raw copy");
                },
            }
            match parse::append_provenance(&content, &source_url) {
                Ok(rewritten) => content = rewritten,
                Err(err) => {
                    warn!(%owner, %repo, file = %file_path, %err, "could not record provenance");
                },
            }
        }

        if let Err(err) = save_file(repo_dir, file_path, &content).await {
            error!(%owner, %repo, file = %file_path, %err, "write failed, dropping file from bundle");
            continue;
        }
        info!(%owner, %repo, file = %file_path, "collected");
        files.push(file_path.clone());
    }

    DiscoveredSkill {
        tree_sha: skill.tree_sha.clone(),
        frontmatter,
        files,
        body,
    }
}

/// Browsable URL recorded in the `_from` provenance list. HEAD keeps the
/// link valid across default-branch renames.
fn source_url(owner: &str, repo: &str, skill: &RemoteSkill) -> String {
    match &skill.dir_path {
        Some(dir) => format!("https://github.com/{owner}/{repo}/tree/HEAD/{dir}"),
        None => format!("https://github.com/{owner}/{repo}/blob/HEAD/{}", skill.skill_path),
    }
}

async fn save_file(repo_dir: &Path, file_path: &str, content: &str) -> anyhow::Result<()> {
    let target = repo_dir.join(file_path);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&target, content)
        .await
        .with_context(|| format!("writing {}", target.display()))
}
