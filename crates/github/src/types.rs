use serde::Deserialize;

/// One repository from the organization listing, with host-side defaults
/// already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRepo {
    pub name: String,
    pub default_branch: String,
    pub visibility: String,
    pub fork: bool,
}

/// One entry of a recursive git tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    #[serde(default)]
    pub path: String,
    /// `blob` for files, `tree` for directories.
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub sha: Option<String>,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }

    pub fn is_tree(&self) -> bool {
        self.kind == "tree"
    }
}

/// A recursive tree listing. `truncated` means the host capped the entry
/// count and the listing is incomplete.
#[derive(Debug, Clone, Default)]
pub struct TreeListing {
    pub entries: Vec<TreeEntry>,
    pub truncated: bool,
}

/// One entry of a directory content listing (the non-recursive fallback).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Core rate-limit quota: remaining requests and the epoch-seconds reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u64,
    pub reset: u64,
}
