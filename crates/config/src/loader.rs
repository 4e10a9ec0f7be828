use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{paths::Paths, schema::AdminConfig};

/// Load `admin.yaml` from the given path.
///
/// Returns `AdminConfig::default()` when the file is missing or malformed —
/// operator config is always optional.
pub fn load_admin(path: &Path) -> AdminConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(path = %path.display(), "no admin config, using defaults");
            return AdminConfig::default();
        },
    };
    match serde_yaml::from_str(&raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed admin config, using defaults");
            AdminConfig::default()
        },
    }
}

/// Find the admin config file: workspace-local first, then user-global
/// (`~/.config/skilldeck/admin.yaml`). Falls back to the workspace path
/// even when neither exists, so `load_admin` can report a clean default.
pub fn find_admin_file(paths: &Paths) -> PathBuf {
    let local = paths.admin_path();
    if local.exists() {
        return local;
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "skilldeck") {
        let global = dirs.config_dir().join("admin.yaml");
        if global.exists() {
            return global;
        }
    }
    local
}

/// Detect the organization identifier used for the org-ownership flag.
///
/// Order: `GH_ORG` env var, then `catalog.org` from the admin config, then
/// the owner component of the `origin` git remote.
pub fn detect_org(admin: &AdminConfig) -> Option<String> {
    if let Ok(org) = std::env::var("GH_ORG")
        && !org.is_empty()
    {
        return Some(org);
    }
    if let Some(org) = &admin.catalog.org {
        return Some(org.clone());
    }
    git_remote_owner()
}

fn git_remote_owner() -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let url = String::from_utf8(output.stdout).ok()?;
    parse_remote_owner(url.trim())
}

/// Extract the owner from a git remote URL.
/// SSH: `git@github.com:owner/repo.git`, HTTPS: `https://github.com/owner/repo`.
fn parse_remote_owner(url: &str) -> Option<String> {
    let rest = if let Some((_, rest)) = url.split_once('@') {
        rest.split_once(':')?.1
    } else {
        let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"))?;
        rest.split_once('/')?.1
    };
    let owner = rest.split('/').next()?;
    if owner.is_empty() {
        None
    } else {
        Some(owner.to_string())
    }
}
