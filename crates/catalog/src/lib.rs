//! Catalog core: SKILL.md parsing, local discovery, the incremental merge
//! engine, governance resolution, flattening, and persistence.
//!
//! The nested catalog (`catalog.yaml`) is the authoritative store; the
//! flattened JSON view is a deterministic projection recomputed on every
//! build. Every stage here is a pure value-in/value-out function so the
//! pipeline can be tested piecewise.

pub mod discover;
pub mod flatten;
pub mod governance;
pub mod merge;
pub mod parse;
pub mod store;
pub mod types;

pub use {
    flatten::{FlattenOptions, flatten},
    governance::Governance,
    merge::merge_catalogs,
    store::CatalogStore,
    types::{
        Catalog, DiscoveredSkill, FlatCatalog, FlatSkill, FreshRepository, RepositoryEntry,
        SkillEntry, UsagePolicy,
    },
};
