use std::path::{Path, PathBuf};

/// Filesystem layout of a skilldeck workspace.
///
/// ```text
/// <root>/
///   data/skills/<platform>/<owner>/<repo>/   collected skill mirror
///   data/catalog.yaml                        nested catalog (authoritative)
///   config/admin.yaml                        operator config
///   config/governance.yaml                   usage-policy table
///   web/static/catalog.json                  flattened catalog
///   web/static/skills/<key>/body.md          per-skill body artifacts
/// ```
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub config_dir: PathBuf,
    pub web_static_dir: PathBuf,
}

impl Paths {
    /// Standard layout relative to a workspace root.
    pub fn from_root(root: &Path) -> Self {
        Self {
            data_dir: root.join("data"),
            config_dir: root.join("config"),
            web_static_dir: root.join("web").join("static"),
        }
    }

    /// Directory holding the collected skill file mirror.
    pub fn skills_dir(&self) -> PathBuf {
        self.data_dir.join("skills")
    }

    /// The nested catalog file.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("catalog.yaml")
    }

    pub fn admin_path(&self) -> PathBuf {
        self.config_dir.join("admin.yaml")
    }

    pub fn governance_path(&self) -> PathBuf {
        self.config_dir.join("governance.yaml")
    }

    /// The flattened catalog consumed by the web frontend.
    pub fn flat_catalog_path(&self) -> PathBuf {
        self.web_static_dir.join("catalog.json")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_from_root() {
        let paths = Paths::from_root(Path::new("/work"));
        assert_eq!(paths.skills_dir(), PathBuf::from("/work/data/skills"));
        assert_eq!(paths.catalog_path(), PathBuf::from("/work/data/catalog.yaml"));
        assert_eq!(paths.admin_path(), PathBuf::from("/work/config/admin.yaml"));
        assert_eq!(
            paths.flat_catalog_path(),
            PathBuf::from("/work/web/static/catalog.json")
        );
    }
}
