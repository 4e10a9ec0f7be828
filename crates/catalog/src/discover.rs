use std::{collections::BTreeMap, path::Path};

use tracing::warn;

use crate::{
    parse,
    types::{DiscoveredSkill, FreshRepository},
};

/// Walk a repository tree for SKILL.md documents.
///
/// A skill is any file named exactly `SKILL.md`, at the root or nested.
/// Path segments starting with `_` are pruned entirely: nothing beneath
/// them is discovered and nothing beneath them appears in bundles.
/// Documents with malformed frontmatter are skipped with a diagnostic;
/// sibling discovery continues.
pub fn discover_skills(root: &Path) -> BTreeMap<String, DiscoveredSkill> {
    let mut skills = BTreeMap::new();
    walk_for_skills(root, root, "", &mut skills);
    skills
}

fn walk_for_skills(
    root: &Path,
    dir: &Path,
    rel: &str,
    skills: &mut BTreeMap<String, DiscoveredSkill>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('_') {
            continue;
        }
        let path = entry.path();
        let rel_path = if rel.is_empty() {
            name.clone()
        } else {
            format!("{rel}/{name}")
        };

        if path.is_dir() {
            walk_for_skills(root, &path, &rel_path, skills);
        } else if name == "SKILL.md" {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), %e, "failed to read SKILL.md");
                    continue;
                },
            };
            match parse::parse_document(&content) {
                Ok(doc) => {
                    let files = bundle_files(root, &rel_path);
                    skills.insert(rel_path, DiscoveredSkill {
                        tree_sha: None,
                        frontmatter: doc.frontmatter,
                        files,
                        body: doc.body,
                    });
                },
                Err(e) => {
                    warn!(path = %path.display(), %e, "skipping non-conforming SKILL.md");
                },
            }
        }
    }
}

/// Collect the bundle file list for a skill document.
///
/// Root-level `SKILL.md` owns exactly itself. A nested skill at
/// `D/SKILL.md` owns every file under `D` recursively (underscore segments
/// pruned), sorted lexicographically and root-relative. If `D` is not an
/// actual directory the bundle degrades to the document path alone.
pub fn bundle_files(root: &Path, skill_path: &str) -> Vec<String> {
    let Some(skill_dir) = skill_path.strip_suffix("/SKILL.md") else {
        return vec!["SKILL.md".to_string()];
    };

    let dir = root.join(skill_dir);
    if !dir.is_dir() {
        return vec![skill_path.to_string()];
    }

    let mut files = Vec::new();
    walk_for_files(&dir, skill_dir, &mut files);
    files.sort();
    files
}

fn walk_for_files(dir: &Path, rel_prefix: &str, files: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('_') {
            continue;
        }
        let path = entry.path();
        let rel_path = format!("{rel_prefix}/{name}");
        if path.is_dir() {
            walk_for_files(&path, &rel_path, files);
        } else {
            files.push(rel_path);
        }
    }
}

/// Discover every repository under the local skills mirror
/// (`<skills_dir>/<platform>/<owner>/<repo>`). Repositories without any
/// discoverable skill are omitted. Local discovery computes no content
/// hashes and knows nothing about visibility; the merge engine fills those
/// from prior state.
pub fn discover_repositories(skills_dir: &Path) -> BTreeMap<String, FreshRepository> {
    let mut repositories = BTreeMap::new();

    for (platform, platform_dir) in subdirs(skills_dir) {
        for (owner, owner_dir) in subdirs(&platform_dir) {
            for (repo, repo_dir) in subdirs(&owner_dir) {
                let skills = discover_skills(&repo_dir);
                if skills.is_empty() {
                    continue;
                }
                let repo_key = format!("{platform}/{owner}/{repo}");
                repositories.insert(repo_key, FreshRepository {
                    skills,
                    ..Default::default()
                });
            }
        }
    }

    repositories
}

fn subdirs(dir: &Path) -> Vec<(String, std::path::PathBuf)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };
    let mut out: Vec<_> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .collect();
    out.sort();
    out
}
