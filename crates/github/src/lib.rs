//! Repository-hosting API client.
//!
//! The collector talks to the host through the [`RepoHost`] trait; the
//! production implementation is [`GithubClient`] over the GitHub REST API.
//! All requests are serial — there is one shared rate limit, and [`RepoHost::pace`]
//! cooperatively sleeps when the remaining quota gets low.

pub mod client;
pub mod types;

pub use {
    client::{GithubClient, RepoHost},
    types::{DirEntry, OrgRepo, RateLimit, TreeEntry, TreeListing},
};
