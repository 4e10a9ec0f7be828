use {
    anyhow::bail,
    chrono::{SecondsFormat, Utc},
    skilldeck_collector::collect,
    skilldeck_config::{Paths, detect_org, find_admin_file, load_admin},
    skilldeck_github::GithubClient,
    tracing::info,
};

/// Collect an organization's skills from GitHub and merge them into the
/// persisted catalog.
///
/// Both preconditions are checked before any network or file activity:
/// a `GITHUB_TOKEN` and an organization (from `GH_ORG`, the admin config,
/// or the git remote).
pub async fn handle_collect(paths: &Paths) -> anyhow::Result<()> {
    let token = match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => bail!("GITHUB_TOKEN is not set; a token with repository read access is required"),
    };
    let admin = load_admin(&find_admin_file(paths));
    let Some(org) = detect_org(&admin) else {
        bail!("no organization configured; set GH_ORG or catalog.org in admin.yaml");
    };

    info!(org, "collecting organization skills");
    let client = GithubClient::new(token);
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let summary = collect(&client, &org, paths, &admin, &now).await?;

    println!(
        "Collected {} skill(s) across {} repositories ({} repos unchanged, {} bundles unchanged, {} repos failed)",
        summary.collected_skills,
        summary.repos_listed,
        summary.skipped_repos,
        summary.skipped_skills,
        summary.errored_repos
    );
    Ok(())
}
