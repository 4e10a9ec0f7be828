//! Tool configuration: workspace paths, the optional `admin.yaml` file,
//! and organization detection.
//!
//! Every input here is optional: a missing or malformed config file
//! degrades to defaults with a warning, never a hard error.

pub mod loader;
pub mod paths;
pub mod schema;

pub use {
    loader::{detect_org, find_admin_file, load_admin},
    paths::Paths,
    schema::{AdminConfig, CatalogConfig, CollectorConfig, SkillConfig},
};
