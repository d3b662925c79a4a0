//! Run configuration
//!
//! Loaded from YAML; every field is optional and falls back to its default:
//!
//! ```yaml
//! extensions: [".xml", ".musicxml", ".mxl"]
//! merge_ties: true
//! skip_unparsable: false
//! ```

use crate::converters::ImportOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Extensions imported when none are configured
pub const DEFAULT_EXTENSIONS: [&str; 5] = [".xml", ".musicxml", ".mxl", ".mid", ".midi"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File extension allow-list (case-insensitive, leading dot optional)
    pub extensions: Vec<String>,
    /// Fold tied notes into a single longer note
    pub merge_ties: bool,
    /// Log and skip files that fail to parse instead of aborting the run
    pub skip_unparsable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            merge_ties: true,
            skip_unparsable: false,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Whether `path` has an allow-listed extension
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            merge_ties: self.merge_ties,
        }
    }
}
