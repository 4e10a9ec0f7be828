//! End-to-end pipeline tests: discover → merge → flatten → persist over a
//! real temp directory layout.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{collections::BTreeMap, path::Path};

use skilldeck_catalog::{
    CatalogStore, FlattenOptions, Governance, discover::discover_repositories, flatten,
    merge_catalogs,
};

const T0: &str = "2024-01-01T00:00:00.000Z";
const T1: &str = "2024-06-01T00:00:00.000Z";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn bodies_of(
    fresh: &BTreeMap<String, skilldeck_catalog::FreshRepository>,
) -> BTreeMap<String, String> {
    let mut bodies = BTreeMap::new();
    for (repo_key, repo) in fresh {
        for (skill_path, skill) in &repo.skills {
            if !skill.body.is_empty() {
                bodies.insert(format!("{repo_key}/{skill_path}"), skill.body.clone());
            }
        }
    }
    bodies
}

#[test]
fn end_to_end_two_skill_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let skills_dir = tmp.path().join("data/skills");
    write(
        &skills_dir,
        "github.com/acme/demo/SKILL.md",
        "---\nname: Foo\n---\nFoo does things.\n",
    );
    write(
        &skills_dir,
        "github.com/acme/demo/tools/bar/SKILL.md",
        "---\nname: Bar\n---\nBar helps Foo.\n",
    );
    write(&skills_dir, "github.com/acme/demo/tools/bar/helper.txt", "x");

    let fresh = discover_repositories(&skills_dir);
    let merged = merge_catalogs(&fresh, &Default::default(), T0);

    assert_eq!(merged.repositories.len(), 1);
    let repo = &merged.repositories["github.com/acme/demo"];
    assert_eq!(repo.skills.len(), 2);
    assert_eq!(repo.skills["tools/bar/SKILL.md"].files, vec![
        "tools/bar/SKILL.md",
        "tools/bar/helper.txt",
    ]);

    let flat = flatten(
        &merged,
        &Governance::default(),
        &bodies_of(&fresh),
        T0,
        &FlattenOptions {
            org: Some("acme".into()),
            excerpt_len: 300,
            fresh_period_days: 0,
        },
    );
    let names: Vec<_> = flat.skills.iter().map(|s| s.display_name()).collect();
    assert_eq!(names, vec!["Bar", "Foo"]);
    assert_eq!(flat.skills[0].excerpt, "Bar helps Foo.");
    assert!(flat.skills[0].is_org_owned);
}

#[test]
fn rebuild_over_unchanged_input_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let skills_dir = tmp.path().join("data/skills");
    write(
        &skills_dir,
        "github.com/acme/demo/SKILL.md",
        "---\nname: Foo\n---\nbody\n",
    );
    let store = CatalogStore::new(tmp.path().join("data/catalog.yaml"));

    // First build.
    let fresh = discover_repositories(&skills_dir);
    let merged = merge_catalogs(&fresh, &store.load(), T0);
    store.save(&merged).unwrap();
    let first = std::fs::read_to_string(store.path()).unwrap();

    // Second build at a later time over identical input.
    let fresh = discover_repositories(&skills_dir);
    let merged = merge_catalogs(&fresh, &store.load(), T1);
    store.save(&merged).unwrap();
    let second = std::fs::read_to_string(store.path()).unwrap();

    assert_eq!(first, second);

    // Flattened ordering is identical too (only generated_at may differ).
    let gov = Governance::default();
    let opts = FlattenOptions {
        org: None,
        excerpt_len: 300,
        fresh_period_days: 0,
    };
    let bodies = bodies_of(&fresh);
    let flat_a = flatten(&merged, &gov, &bodies, T0, &opts);
    let flat_b = flatten(&merged, &gov, &bodies, T1, &opts);
    assert_eq!(flat_a.skills, flat_b.skills);
}

#[test]
fn removed_skill_disappears_on_rebuild() {
    let tmp = tempfile::tempdir().unwrap();
    let skills_dir = tmp.path().join("data/skills");
    write(
        &skills_dir,
        "github.com/acme/demo/keep/SKILL.md",
        "---\nname: keep\n---\nbody\n",
    );
    write(
        &skills_dir,
        "github.com/acme/demo/gone/SKILL.md",
        "---\nname: gone\n---\nbody\n",
    );
    let store = CatalogStore::new(tmp.path().join("data/catalog.yaml"));

    let fresh = discover_repositories(&skills_dir);
    store
        .save(&merge_catalogs(&fresh, &store.load(), T0))
        .unwrap();

    std::fs::remove_dir_all(skills_dir.join("github.com/acme/demo/gone")).unwrap();

    let fresh = discover_repositories(&skills_dir);
    let merged = merge_catalogs(&fresh, &store.load(), T1);
    let skills = &merged.repositories["github.com/acme/demo"].skills;
    assert!(skills.contains_key("keep/SKILL.md"));
    assert!(!skills.contains_key("gone/SKILL.md"));
}
