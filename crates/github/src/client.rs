use std::time::{SystemTime, UNIX_EPOCH};

use {
    anyhow::{Context, bail},
    async_trait::async_trait,
    base64::Engine,
    serde::Deserialize,
    serde::de::DeserializeOwned,
    tracing::info,
};

use crate::types::{DirEntry, OrgRepo, RateLimit, TreeEntry, TreeListing};

const USER_AGENT: &str = "skilldeck-collector";
const PER_PAGE: u32 = 100;
/// Sleep until the quota resets once fewer than this many requests remain.
const RATE_LIMIT_FLOOR: u64 = 100;

/// The capabilities the collector needs from a repository host.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// List all repositories of an organization (paginated internally).
    async fn list_org_repos(&self, org: &str) -> anyhow::Result<Vec<OrgRepo>>;

    /// Head commit SHA of the given branch.
    async fn branch_head_sha(&self, owner: &str, repo: &str, branch: &str)
    -> anyhow::Result<String>;

    /// Recursive tree listing rooted at a tree/commit SHA.
    async fn get_tree(&self, owner: &str, repo: &str, tree_sha: &str)
    -> anyhow::Result<TreeListing>;

    /// Non-recursive directory listing (fallback for truncated trees).
    async fn list_dir(&self, owner: &str, repo: &str, path: &str)
    -> anyhow::Result<Vec<DirEntry>>;

    /// Fetch one file's decoded UTF-8 content.
    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> anyhow::Result<String>;

    /// Cooperative throttle: block until enough quota remains.
    async fn pace(&self) -> anyhow::Result<()>;
}

/// GitHub REST API client.
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, "https://api.github.com")
    }

    /// Point the client at a different API root (tests).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> anyhow::Result<T> {
        let url = format!("{}{path_and_query}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("GET {path_and_query}"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("GET {path_and_query}: HTTP {status}");
        }
        resp.json()
            .await
            .with_context(|| format!("GET {path_and_query}: malformed response"))
    }
}

#[derive(Deserialize)]
struct WireRepo {
    name: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    fork: bool,
}

#[derive(Deserialize)]
struct WireBranch {
    commit: WireCommit,
}

#[derive(Deserialize)]
struct WireCommit {
    sha: String,
}

#[derive(Deserialize)]
struct WireTree {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct WireFile {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireRateLimit {
    resources: WireRateResources,
}

#[derive(Deserialize)]
struct WireRateResources {
    core: WireRateCore,
}

#[derive(Deserialize)]
struct WireRateCore {
    remaining: u64,
    reset: u64,
}

impl GithubClient {
    async fn rate_limit(&self) -> anyhow::Result<RateLimit> {
        let wire: WireRateLimit = self.get_json("/rate_limit").await?;
        Ok(RateLimit {
            remaining: wire.resources.core.remaining,
            reset: wire.resources.core.reset,
        })
    }
}

#[async_trait]
impl RepoHost for GithubClient {
    async fn list_org_repos(&self, org: &str) -> anyhow::Result<Vec<OrgRepo>> {
        let mut repos = Vec::new();
        let mut page = 1u32;

        loop {
            let batch: Vec<WireRepo> = self
                .get_json(&format!(
                    "/orgs/{org}/repos?type=all&per_page={PER_PAGE}&page={page}"
                ))
                .await?;
            if batch.is_empty() {
                break;
            }
            for repo in batch {
                repos.push(OrgRepo {
                    name: repo.name,
                    default_branch: repo.default_branch.unwrap_or_else(|| "main".into()),
                    visibility: repo.visibility.unwrap_or_else(|| "private".into()),
                    fork: repo.fork,
                });
            }
            page += 1;
        }

        Ok(repos)
    }

    async fn branch_head_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> anyhow::Result<String> {
        let wire: WireBranch = self
            .get_json(&format!("/repos/{owner}/{repo}/branches/{branch}"))
            .await?;
        Ok(wire.commit.sha)
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_sha: &str,
    ) -> anyhow::Result<TreeListing> {
        let wire: WireTree = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/git/trees/{tree_sha}?recursive=true"
            ))
            .await?;
        Ok(TreeListing {
            entries: wire.tree,
            truncated: wire.truncated,
        })
    }

    async fn list_dir(&self, owner: &str, repo: &str, path: &str) -> anyhow::Result<Vec<DirEntry>> {
        let value: serde_json::Value = self
            .get_json(&format!("/repos/{owner}/{repo}/contents/{path}"))
            .await?;
        if !value.is_array() {
            bail!("contents of {path} is not a directory");
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> anyhow::Result<String> {
        let value: serde_json::Value = self
            .get_json(&format!("/repos/{owner}/{repo}/contents/{path}"))
            .await?;
        if value.is_array() {
            bail!("{path} is a directory, not a file");
        }
        let wire: WireFile = serde_json::from_value(value)?;
        if wire.kind != "file" {
            bail!("{path} is not a file (type: {})", wire.kind);
        }
        let encoded = wire
            .content
            .with_context(|| format!("no content returned for {path}"))?;
        // The API wraps base64 content in newlines.
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .with_context(|| format!("invalid base64 content for {path}"))?;
        String::from_utf8(bytes).with_context(|| format!("{path} is not valid UTF-8"))
    }

    async fn pace(&self) -> anyhow::Result<()> {
        let quota = self.rate_limit().await?;
        if quota.remaining >= RATE_LIMIT_FLOOR {
            return Ok(());
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let wait_secs = quota.reset.saturating_sub(now) + 1;
        info!(
            remaining = quota.remaining,
            wait_secs, "rate limit low, waiting for reset"
        );
        tokio::time::sleep(std::time::Duration::from_secs(wait_secs)).await;
        Ok(())
    }
}
