//! Manifest parsing and queries for `manifesto.yml`.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Section keys, canonical spelling first.
const LAYERS: &[&str] = &["camadas", "layers"];
const RESOURCES: &[&str] = &["recursos", "resources"];
const BLUEPRINTS: &[&str] = &["blueprints"];

/// Entry field keys, canonical spelling first.
const TECHNOLOGY: &[&str] = &["tecnologia", "technology"];
const KIND: &[&str] = &["tipo", "type"];
const RESOURCE: &[&str] = &["recurso", "resource"];
const OUTPUT: &[&str] = &["output"];

static EMPTY: LazyLock<Mapping> = LazyLock::new(Mapping::new);

/// A loaded manifest document.
///
/// Wraps the raw YAML tree. Sections and entries are interpreted lazily, so a
/// missing or malformed section only ever shows up as an empty result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestDocument {
    data: Mapping,
}

/// Errors that can occur when loading a manifest or writing derived files.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Load {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Normalize a technology name: surrounding whitespace removed, lowercased.
pub fn normalize_technology(tech: &str) -> String {
    tech.trim().to_lowercase()
}

impl ManifestDocument {
    /// Load a manifest from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "read manifest");
        Self::parse(&contents)
    }

    /// Parse a manifest from a YAML string.
    pub fn parse(s: &str) -> Result<Self, ManifestError> {
        let mut root: Value = serde_yaml::from_str(s)?;
        root.apply_merge()?;
        let data = match root {
            Value::Mapping(data) => data,
            Value::Null => Mapping::new(),
            other => {
                warn!(root = ?other, "manifest root is not a mapping, treating it as empty");
                Mapping::new()
            }
        };
        Ok(Self::from_mapping(data))
    }

    /// Wrap an already parsed document tree.
    pub fn from_mapping(data: Mapping) -> Self {
        Self { data }
    }

    /// The raw root mapping.
    pub fn data(&self) -> &Mapping {
        &self.data
    }

    /// The `camadas` section.
    pub fn layers(&self) -> &Mapping {
        self.section(LAYERS)
    }

    /// The `recursos` section.
    pub fn resources(&self) -> &Mapping {
        self.section(RESOURCES)
    }

    /// The `blueprints` section.
    pub fn blueprints(&self) -> &Mapping {
        self.section(BLUEPRINTS)
    }

    fn section(&self, keys: &[&str]) -> &Mapping {
        match field(&self.data, keys) {
            Some(Value::Mapping(section)) => section,
            Some(other) => {
                debug!(section = keys[0], value = ?other, "section is not a mapping");
                &EMPTY
            }
            None => &EMPTY,
        }
    }

    /// Look up a layer by name.
    pub fn layer<'a>(&'a self, name: &'a str) -> Option<Layer<'a>> {
        Some(Layer {
            name,
            fields: self.layers().get(name)?.as_mapping()?,
        })
    }

    /// All layers with a mapping entry, in manifest order.
    pub fn iter_layers(&self) -> impl Iterator<Item = Layer<'_>> {
        entries(self.layers()).filter_map(|(name, value)| {
            Some(Layer {
                name,
                fields: value.as_mapping()?,
            })
        })
    }

    /// Normalized technology of a layer, if it has a string one.
    pub fn technology_of_layer(&self, name: &str) -> Option<String> {
        self.layer(name)?.technology()
    }

    /// Names of the layers using `tech`, compared after normalizing both sides.
    pub fn layers_by_technology(&self, tech: &str) -> Vec<String> {
        let tech = normalize_technology(tech);
        self.iter_layers()
            .filter(|layer| layer.technology().as_deref() == Some(tech.as_str()))
            .map(|layer| layer.name().to_string())
            .collect()
    }

    /// Raw entry of a resource.
    pub fn resource(&self, name: &str) -> Option<&Mapping> {
        self.resources().get(name)?.as_mapping()
    }

    /// Typed view of a resource.
    pub fn resource_view<'a>(&'a self, name: &'a str) -> Option<Resource<'a>> {
        Some(Resource {
            name,
            fields: self.resources().get(name)?.as_mapping()?,
        })
    }

    /// All resources with a mapping entry, in manifest order.
    pub fn iter_resources(&self) -> impl Iterator<Item = Resource<'_>> {
        entries(self.resources()).filter_map(|(name, value)| {
            Some(Resource {
                name,
                fields: value.as_mapping()?,
            })
        })
    }

    /// Names of the resources whose `tipo` is exactly `kind`.
    pub fn resources_by_type(&self, kind: &str) -> Vec<String> {
        self.iter_resources()
            .filter(|resource| resource.kind() == Some(kind))
            .map(|resource| resource.name().to_string())
            .collect()
    }

    /// Raw entry of a blueprint.
    pub fn blueprint(&self, name: &str) -> Option<&Mapping> {
        self.blueprints().get(name)?.as_mapping()
    }

    /// Typed view of a blueprint.
    pub fn blueprint_view<'a>(&'a self, name: &'a str) -> Option<Blueprint<'a>> {
        Some(Blueprint {
            name,
            fields: self.blueprints().get(name)?.as_mapping()?,
        })
    }

    /// All blueprints with a mapping entry, in manifest order.
    pub fn iter_blueprints(&self) -> impl Iterator<Item = Blueprint<'_>> {
        entries(self.blueprints()).filter_map(|(name, value)| {
            Some(Blueprint {
                name,
                fields: value.as_mapping()?,
            })
        })
    }

    /// Names of the blueprints whose `recurso` is exactly `resource`.
    pub fn blueprints_for_resource(&self, resource: &str) -> Vec<String> {
        self.iter_blueprints()
            .filter(|blueprint| blueprint.resource() == Some(resource))
            .map(|blueprint| blueprint.name().to_string())
            .collect()
    }
}

/// A layer entry (`camadas.<name>`).
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    name: &'a str,
    fields: &'a Mapping,
}

impl<'a> Layer<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The technology as written in the manifest.
    pub fn raw_technology(&self) -> Option<&'a str> {
        field(self.fields, TECHNOLOGY)?.as_str()
    }

    /// The normalized technology.
    pub fn technology(&self) -> Option<String> {
        self.raw_technology().map(normalize_technology)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &'a Mapping {
        self.fields
    }
}

/// A resource entry (`recursos.<name>`).
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    name: &'a str,
    fields: &'a Mapping,
}

impl<'a> Resource<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The `tipo` tag, untouched.
    pub fn kind(&self) -> Option<&'a str> {
        field(self.fields, KIND)?.as_str()
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &'a Mapping {
        self.fields
    }
}

/// A blueprint entry (`blueprints.<name>`).
#[derive(Debug, Clone, Copy)]
pub struct Blueprint<'a> {
    name: &'a str,
    fields: &'a Mapping,
}

impl<'a> Blueprint<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Name of the resource this blueprint generates.
    pub fn resource(&self) -> Option<&'a str> {
        field(self.fields, RESOURCE)?.as_str()
    }

    /// Output path.
    pub fn output(&self) -> Option<&'a str> {
        field(self.fields, OUTPUT)?.as_str()
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &'a Mapping {
        self.fields
    }
}

/// First present key wins.
fn field<'a>(entry: &'a Mapping, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| entry.get(*key))
}

/// String-keyed entries of a section; other keys cannot be named and are skipped.
fn entries(section: &Mapping) -> impl Iterator<Item = (&str, &Value)> {
    section
        .iter()
        .filter_map(|(key, value)| Some((key.as_str()?, value)))
}
