//! Per-book configuration: built-in defaults overlaid by `Global Material/Config.yml`

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info, warn};

use super::CONFIG_FILE;

/// Error types for per-book configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} must contain a key-value mapping", path.display())]
    NotAMapping { path: PathBuf },

    #[error("Invalid value for '{key}': {source}")]
    InvalidValue {
        key: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
}

/// How chapters are laid out in the book
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChapterStructure {
    #[default]
    Linear,
    /// Any other mode, kept verbatim for the generation step
    Other(String),
}

impl From<String> for ChapterStructure {
    fn from(s: String) -> Self {
        match s.as_str() {
            "linear" => Self::Linear,
            _ => Self::Other(s),
        }
    }
}

impl From<ChapterStructure> for String {
    fn from(structure: ChapterStructure) -> Self {
        structure.to_string()
    }
}

impl fmt::Display for ChapterStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Settings the generation step needs for one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookConfig {
    /// Generation model identifier
    pub model: String,

    /// Target manuscript length in words
    pub target_length: u32,

    pub chapter_count: u32,

    pub chapter_structure: ChapterStructure,

    /// Words to produce per nightly session
    pub nightly_output_target: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            model: "claude-opus-4-6".to_string(),
            target_length: 90_000,
            chapter_count: 30,
            chapter_structure: ChapterStructure::Linear,
            nightly_output_target: 1500,
        }
    }
}

impl BookConfig {
    /// Keys accepted from the override file, anything else is dropped
    pub const KEYS: [&'static str; 5] = [
        "model",
        "target_length",
        "chapter_count",
        "chapter_structure",
        "nightly_output_target",
    ];

    /// Load the book's config, falling back to defaults when no override file exists
    pub fn load(book_dir: &Path) -> Result<Self, ConfigError> {
        let path = book_dir.join(CONFIG_FILE);
        debug!(?path, "BookConfig::load: called");

        if !path.exists() {
            warn!("{} not found - using defaults", CONFIG_FILE);
            let config = Self::default();
            info!("Config: {:?}", config);
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let document: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        let config = match document {
            Value::Null => Self::default(),
            Value::Mapping(_) => Self::from_overrides(&document)?,
            _ => return Err(ConfigError::NotAMapping { path }),
        };

        info!("Config loaded from {}", path.display());
        info!("Config: {:?}", config);
        Ok(config)
    }

    /// Defaults with the recognised keys of `overrides` copied over
    pub fn from_overrides(overrides: &Value) -> Result<Self, ConfigError> {
        if let Value::Mapping(mapping) = overrides {
            for key in mapping.keys() {
                let recognised = key.as_str().is_some_and(|k| Self::KEYS.contains(&k));
                if !recognised {
                    debug!(?key, "BookConfig::from_overrides: ignoring unrecognised key");
                }
            }
        }

        let defaults = Self::default();
        Ok(Self {
            model: overlay(overrides, "model", defaults.model)?,
            target_length: overlay(overrides, "target_length", defaults.target_length)?,
            chapter_count: overlay(overrides, "chapter_count", defaults.chapter_count)?,
            chapter_structure: overlay(overrides, "chapter_structure", defaults.chapter_structure)?,
            nightly_output_target: overlay(overrides, "nightly_output_target", defaults.nightly_output_target)?,
        })
    }
}

fn overlay<T: DeserializeOwned>(overrides: &Value, key: &'static str, default: T) -> Result<T, ConfigError> {
    match overrides.get(key) {
        Some(value) => {
            serde_yaml::from_value(value.clone()).map_err(|source| ConfigError::InvalidValue { key, source })
        }
        None => Ok(default),
    }
}
