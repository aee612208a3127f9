//! Env file generation from layer technologies.

use crate::manifest::{ManifestDocument, ManifestError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Suffix appended to every upper-cased layer name.
pub const TECHNOLOGY_SUFFIX: &str = "_TECNOLOGIA";

impl ManifestDocument {
    /// One `KEY=value` line per layer with a string technology, in manifest order.
    pub fn technology_env_lines(&self) -> Vec<String> {
        self.iter_layers()
            .filter_map(|layer| {
                let tech = layer.technology()?;
                Some(format!(
                    "{}{TECHNOLOGY_SUFFIX}={tech}",
                    layer.name().to_uppercase()
                ))
            })
            .collect()
    }

    /// Render the technology env file. Always ends with exactly one newline.
    pub fn technology_env(&self) -> String {
        let mut contents = self.technology_env_lines().join("\n");
        contents.push('\n');
        contents
    }

    /// Write the technology env file to `path`, replacing it if present.
    pub fn generate_technology_env_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let contents = self.technology_env();
        fs::write(path, &contents).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote technology env file");
        Ok(())
    }
}
