//! Manifesto core: project manifest loading, queries, and env generation.
//!
//! A manifest (`manifesto.yml`) declares a project's layers (`camadas`),
//! resources (`recursos`) and blueprints. Lookups never fail: a missing or
//! malformed section or entry just yields `None` or an empty list.

mod config;
mod generate;
mod manifest;

pub use config::{
    ConfigError, DEFAULT_ENV_OUTPUT, DEFAULT_MANIFEST, EnvConfig, ManifestConfig, UserConfig,
};
pub use generate::TECHNOLOGY_SUFFIX;
pub use manifest::{
    Blueprint, Layer, ManifestDocument, ManifestError, Resource, normalize_technology,
};
pub use serde_yaml::{Mapping, Value};
