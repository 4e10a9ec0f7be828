use std::path::{Path, PathBuf};

use {anyhow::Context, tracing::warn};

use crate::types::{Catalog, FlatCatalog};

/// Persistent storage for the nested catalog, with atomic writes.
///
/// Serialization is YAML with `BTreeMap`-ordered keys so the persisted file
/// is byte-stable across runs and diff-friendly under version control.
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the prior catalog. A missing or malformed file is treated as
    /// empty prior state, never a fatal error.
    pub fn load(&self) -> Catalog {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Catalog::default(),
        };
        match serde_yaml::from_str(&raw) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed catalog, starting from empty state");
                Catalog::default()
            },
        }
    }

    /// Save the catalog atomically via temp file + rename. Either the full
    /// catalog lands on disk or the previous file is left intact.
    pub fn save(&self, catalog: &Catalog) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("yaml.tmp");
        let data = serde_yaml::to_string(catalog).context("serialize catalog")?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write the flattened catalog as pretty-printed JSON with a trailing
/// newline, atomically.
pub fn write_flat_catalog(path: &Path, flat: &FlatCatalog) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut data = serde_json::to_string_pretty(flat).context("serialize flat catalog")?;
    data.push('\n');
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Write a skill's full body text to the static side artifact the frontend
/// lazy-loads: `<static_dir>/skills/<key minus trailing /SKILL.md>/body.md`.
pub fn write_skill_body(static_dir: &Path, key: &str, body: &str) -> anyhow::Result<()> {
    let dir_key = key.strip_suffix("/SKILL.md").unwrap_or(key);
    let body_path = static_dir.join("skills").join(dir_key).join("body.md");
    if let Some(parent) = body_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&body_path, body)
        .with_context(|| format!("write body artifact for {key}"))?;
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::types::{RepositoryEntry, SkillEntry},
    };

    fn sample_catalog() -> Catalog {
        Catalog {
            repositories: [("github.com/acme/tools".to_string(), RepositoryEntry {
                visibility: "public".into(),
                repo_sha: Some("abc123".into()),
                skills: [("SKILL.md".to_string(), SkillEntry {
                    tree_sha: None,
                    updated_at: Some("2024-01-01T00:00:00.000Z".into()),
                    registered_at: Some("2024-01-01T00:00:00.000Z".into()),
                    frontmatter: Default::default(),
                    files: vec!["SKILL.md".into()],
                })]
                .into(),
                ..Default::default()
            })]
            .into(),
        }
    }

    #[test]
    fn load_missing_returns_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(tmp.path().join("catalog.yaml"));
        assert_eq!(store.load(), Catalog::default());
    }

    #[test]
    fn load_malformed_returns_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.yaml");
        std::fs::write(&path, "repositories: [broken").unwrap();
        let store = CatalogStore::new(path);
        assert_eq!(store.load(), Catalog::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(tmp.path().join("data/catalog.yaml"));
        let catalog = sample_catalog();
        store.save(&catalog).unwrap();
        assert_eq!(store.load(), catalog);
        // No temp file left behind.
        assert!(!tmp.path().join("data/catalog.yaml.tmp").exists());
    }

    #[test]
    fn save_is_byte_stable() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(tmp.path().join("catalog.yaml"));
        let catalog = sample_catalog();
        store.save(&catalog).unwrap();
        let first = std::fs::read_to_string(store.path()).unwrap();
        store.save(&catalog).unwrap();
        let second = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flat_catalog_ends_with_newline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("static/catalog.json");
        let flat = FlatCatalog {
            generated_at: "2024-01-01T00:00:00.000Z".into(),
            fresh_period_days: 0,
            skills: vec![],
        };
        write_flat_catalog(&path, &flat).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with("}\n"));
        let parsed: FlatCatalog = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, flat);
    }

    #[test]
    fn body_artifact_strips_document_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill_body(
            tmp.path(),
            "github.com/acme/tools/nested/SKILL.md",
            "full body",
        )
        .unwrap();
        let body =
            std::fs::read_to_string(tmp.path().join("skills/github.com/acme/tools/nested/body.md"))
                .unwrap();
        assert_eq!(body, "full body");
    }
}
