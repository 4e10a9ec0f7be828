use {
    skilldeck_github::{RepoHost, TreeEntry},
    tracing::debug,
};

/// File name that marks a skill bundle.
pub const SKILL_DOC: &str = "SKILL.md";

/// Conventional skills directory probed when the recursive tree listing is
/// truncated.
const CONVENTION_DIR: &str = ".claude/skills";

/// A skill located in a remote repository, before any content is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSkill {
    /// Root-relative path of the SKILL.md (the skill's identity).
    pub skill_path: String,
    /// Bundle directory; `None` for a root-level SKILL.md.
    pub dir_path: Option<String>,
    /// Tree SHA of the bundle directory when the listing provides one.
    /// `None` means freshness cannot be determined and the skill is always
    /// re-fetched.
    pub tree_sha: Option<String>,
    /// Sorted root-relative paths of every file in the bundle.
    pub files: Vec<String>,
}

/// Locate skill bundles in a full recursive tree listing.
///
/// A root-level `SKILL.md` is a single-file bundle. Every nested `SKILL.md`
/// claims its whole directory subtree. Paths containing an
/// underscore-prefixed segment are private and never surfaced, neither as
/// skills nor as bundle files.
pub fn discover_skills_from_tree(entries: &[TreeEntry]) -> Vec<RemoteSkill> {
    let mut skills = Vec::new();

    if entries.iter().any(|e| e.is_blob() && e.path == SKILL_DOC) {
        skills.push(RemoteSkill {
            skill_path: SKILL_DOC.to_string(),
            dir_path: None,
            tree_sha: None,
            files: vec![SKILL_DOC.to_string()],
        });
    }

    for entry in entries {
        if !entry.is_blob() || has_private_segment(&entry.path) {
            continue;
        }
        let Some(dir) = entry.path.strip_suffix("/SKILL.md") else {
            continue;
        };

        let tree_sha = entries
            .iter()
            .find(|e| e.is_tree() && e.path == dir)
            .and_then(|e| e.sha.clone());

        let prefix = format!("{dir}/");
        let mut files: Vec<String> = entries
            .iter()
            .filter(|e| {
                e.is_blob() && e.path.starts_with(&prefix) && !has_private_segment(&e.path)
            })
            .map(|e| e.path.clone())
            .collect();
        files.sort();

        skills.push(RemoteSkill {
            skill_path: entry.path.clone(),
            dir_path: Some(dir.to_string()),
            tree_sha,
            files,
        });
    }

    skills
}

/// Best-effort discovery for repositories whose tree listing was truncated:
/// probe the root SKILL.md and each directory under the conventional skills
/// location. Bundles found this way carry no tree SHA and list only their
/// SKILL.md, so they are re-fetched on every run.
pub async fn discover_skills_fallback(
    host: &dyn RepoHost,
    owner: &str,
    repo: &str,
) -> Vec<RemoteSkill> {
    let mut skills = Vec::new();

    if host.fetch_file(owner, repo, SKILL_DOC).await.is_ok() {
        skills.push(RemoteSkill {
            skill_path: SKILL_DOC.to_string(),
            dir_path: None,
            tree_sha: None,
            files: vec![SKILL_DOC.to_string()],
        });
    }

    let entries = match host.list_dir(owner, repo, CONVENTION_DIR).await {
        Ok(entries) => entries,
        Err(err) => {
            debug!(%owner, %repo, %err, "no conventional skills directory");
            return skills;
        },
    };

    for entry in entries {
        if entry.kind != "dir" || entry.name.starts_with('_') {
            continue;
        }
        let skill_path = format!("{}/{SKILL_DOC}", entry.path);
        if host.fetch_file(owner, repo, &skill_path).await.is_ok() {
            skills.push(RemoteSkill {
                dir_path: Some(entry.path.clone()),
                tree_sha: None,
                files: vec![skill_path.clone()],
                skill_path,
            });
        }
    }

    skills
}

fn has_private_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('_'))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn blob(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: "blob".to_string(),
            sha: Some(format!("blob-{path}")),
        }
    }

    fn dir(path: &str, sha: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: "tree".to_string(),
            sha: Some(sha.to_string()),
        }
    }

    #[test]
    fn root_skill_is_single_file_bundle() {
        let entries = vec![blob("SKILL.md"), blob("README.md")];
        let skills = discover_skills_from_tree(&entries);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].skill_path, "SKILL.md");
        assert_eq!(skills[0].dir_path, None);
        assert_eq!(skills[0].tree_sha, None);
        assert_eq!(skills[0].files, vec!["SKILL.md"]);
    }

    #[test]
    fn nested_skill_claims_its_subtree() {
        let entries = vec![
            dir("tools", "t-outer"),
            dir("tools/bar", "t-bar"),
            blob("tools/bar/SKILL.md"),
            blob("tools/bar/scripts/run.sh"),
            blob("tools/other.txt"),
        ];
        let skills = discover_skills_from_tree(&entries);
        assert_eq!(skills.len(), 1);
        let skill = &skills[0];
        assert_eq!(skill.skill_path, "tools/bar/SKILL.md");
        assert_eq!(skill.dir_path.as_deref(), Some("tools/bar"));
        assert_eq!(skill.tree_sha.as_deref(), Some("t-bar"));
        assert_eq!(skill.files, vec![
            "tools/bar/SKILL.md",
            "tools/bar/scripts/run.sh"
        ]);
    }

    #[test]
    fn private_segments_are_pruned() {
        let entries = vec![
            blob("_drafts/SKILL.md"),
            blob("skills/_wip/SKILL.md"),
            dir("skills/ok", "t-ok"),
            blob("skills/ok/SKILL.md"),
            blob("skills/ok/_notes/secret.md"),
            blob("skills/ok/ref.md"),
        ];
        let skills = discover_skills_from_tree(&entries);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].skill_path, "skills/ok/SKILL.md");
        assert_eq!(skills[0].files, vec![
            "skills/ok/SKILL.md",
            "skills/ok/ref.md"
        ]);
    }

    #[test]
    fn missing_dir_entry_means_no_tree_sha() {
        let entries = vec![blob("skills/foo/SKILL.md")];
        let skills = discover_skills_from_tree(&entries);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].tree_sha, None);
    }

    #[test]
    fn root_skill_listed_before_nested() {
        let entries = vec![
            dir("zeta", "t-z"),
            blob("zeta/SKILL.md"),
            blob("SKILL.md"),
        ];
        let skills = discover_skills_from_tree(&entries);
        assert_eq!(skills[0].skill_path, "SKILL.md");
        assert_eq!(skills[1].skill_path, "zeta/SKILL.md");
    }

    #[test]
    fn sibling_bundles_do_not_leak_files() {
        let entries = vec![
            dir("skills/a", "t-a"),
            blob("skills/a/SKILL.md"),
            dir("skills/ab", "t-ab"),
            blob("skills/ab/SKILL.md"),
            blob("skills/ab/extra.md"),
        ];
        let skills = discover_skills_from_tree(&entries);
        let a = skills.iter().find(|s| s.skill_path == "skills/a/SKILL.md").unwrap();
        // "skills/ab/..." must not match the "skills/a" prefix.
        assert_eq!(a.files, vec!["skills/a/SKILL.md"]);
    }
}
