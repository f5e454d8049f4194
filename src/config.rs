//! Generator configuration, loaded from an optional `wither.toml` at the
//! workspace root. A missing file yields the defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "wither.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml_edit::de::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub markers: MarkersConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Attribute names that opt declarations in and fields out.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MarkersConfig {
    /// Declaration-level generation marker, e.g. `#[wither]`.
    #[serde(default = "default_attribute")]
    pub attribute: String,
    /// Argument of the per-field exclusion marker, e.g. `#[wither(skip)]`.
    #[serde(default = "default_skip_argument")]
    pub skip_argument: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Directory names excluded from source discovery, in addition to
    /// hidden directories.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_attribute() -> String {
    "wither".to_string()
}

fn default_skip_argument() -> String {
    "skip".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["target".to_string()]
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            attribute: default_attribute(),
            skip_argument: default_skip_argument(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.markers.attribute) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "markers.attribute `{}` is not an identifier",
                    self.markers.attribute
                ),
            });
        }
        if !is_identifier(&self.markers.skip_argument) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "markers.skip_argument `{}` is not an identifier",
                    self.markers.skip_argument
                ),
            });
        }
        if self.discovery.exclude.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                message: "discovery.exclude contains an empty entry".to_string(),
            });
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn load_from_str(input: &str) -> Result<GeneratorConfig, ConfigError> {
    let config: GeneratorConfig = toml_edit::de::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<GeneratorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

/// Load `wither.toml` from `dir`, or fall back to defaults when absent.
pub fn load_or_default(dir: impl AsRef<Path>) -> Result<GeneratorConfig, ConfigError> {
    let path = dir.as_ref().join(CONFIG_FILE_NAME);
    if path.exists() {
        load_from_path(path)
    } else {
        Ok(GeneratorConfig::default())
    }
}
