use std::collections::BTreeMap;

use {
    chrono::{SecondsFormat, Utc},
    skilldeck_catalog::{
        CatalogStore, FlattenOptions, Governance, discover, flatten, merge_catalogs,
        store::{write_flat_catalog, write_skill_body},
    },
    skilldeck_config::{Paths, detect_org, find_admin_file, load_admin},
    tracing::{info, warn},
};

/// Rebuild the nested catalog from the on-disk skill mirror, then
/// regenerate the flattened view and the per-skill body artifacts.
///
/// Unreadable skill documents are logged and skipped; the build itself
/// only fails when the catalog cannot be written.
pub fn handle_build(paths: &Paths) -> anyhow::Result<()> {
    let admin = load_admin(&find_admin_file(paths));
    let org = detect_org(&admin);
    match &org {
        Some(org) => info!(org, "building catalog"),
        None => warn!("no organization detected; org-ownership flags will be false"),
    }

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let store = CatalogStore::new(paths.catalog_path());
    let prior = store.load();

    let fresh = discover::discover_repositories(&paths.skills_dir());
    let mut bodies = BTreeMap::new();
    for (repo_key, repo) in &fresh {
        for (skill_path, skill) in &repo.skills {
            bodies.insert(format!("{repo_key}/{skill_path}"), skill.body.clone());
        }
    }

    let merged = merge_catalogs(&fresh, &prior, &now);
    store.save(&merged)?;

    let governance = Governance::load(&paths.governance_path());
    let opts = FlattenOptions {
        org,
        excerpt_len: admin.catalog.skill.excerpt_len,
        fresh_period_days: admin.catalog.skill.fresh_period_days,
    };
    let flat = flatten(&merged, &governance, &bodies, &now, &opts);
    write_flat_catalog(&paths.flat_catalog_path(), &flat)?;
    for skill in &flat.skills {
        if let Some(body) = bodies.get(&skill.key) {
            write_skill_body(&paths.web_static_dir, &skill.key, body)?;
        }
    }

    println!(
        "Catalog: {} repositories, {} skills -> {}",
        merged.repositories.len(),
        merged.skill_count(),
        store.path().display()
    );
    println!(
        "Flat catalog: {} skills -> {}",
        flat.skills.len(),
        paths.flat_catalog_path().display()
    );
    Ok(())
}
