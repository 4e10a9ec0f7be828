//! Incremental remote skill collection.
//!
//! Walks an organization's repositories through a [`skilldeck_github::RepoHost`],
//! short-circuiting on repository head SHAs and per-skill bundle tree SHAs
//! so unchanged content is never re-downloaded, then merges the result into
//! the persisted catalog. Fetches are strictly serial: the host's rate
//! limit is one shared resource.

pub mod run;
pub mod tree;

pub use {
    run::{RunSummary, collect},
    tree::RemoteSkill,
};
