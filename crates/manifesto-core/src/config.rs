//! User configuration from ~/.config/manifesto/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Manifest path used when neither the CLI nor the user config names one.
pub const DEFAULT_MANIFEST: &str = "manifesto.yml";

/// Env file written when neither the CLI nor the user config names one.
pub const DEFAULT_ENV_OUTPUT: &str = ".env";

/// User configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Manifest location.
    pub manifest: ManifestConfig,
    /// Env file generation.
    pub env: EnvConfig,
}

/// Manifest location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Path to the manifest, relative to the working directory.
    pub path: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MANIFEST),
        }
    }
}

/// Env file generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Where the technology env file is written.
    pub output: PathBuf,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_ENV_OUTPUT),
        }
    }
}

/// Errors that can occur when reading a user config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl UserConfig {
    /// Load user config from the default path, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring user config: {e}");
                Self::default()
            }
        }
    }

    /// Load user config from a specific path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get the default config path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("manifesto").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml = r#"
            [manifest]
            path = "infra/manifesto.yml"

            [env]
            output = "deploy/.env"
        "#;

        let config: UserConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.manifest.path, PathBuf::from("infra/manifesto.yml"));
        assert_eq!(config.env.output, PathBuf::from("deploy/.env"));
    }

    #[test]
    fn default_config() {
        let config = UserConfig::default();
        assert_eq!(config.manifest.path, PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(config.env.output, PathBuf::from(DEFAULT_ENV_OUTPUT));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: UserConfig = toml::from_str("[env]\noutput = \"out.env\"").unwrap();
        assert_eq!(config.manifest.path, PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(config.env.output, PathBuf::from("out.env"));

        let config: UserConfig = toml::from_str("").unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[manifest\npath = 1").unwrap();

        let err = UserConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = UserConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
