//! Organizer configuration.
//!
//! The category table, conflict policy and activity log location can be
//! overridden with a TOML file. Categories are an array of tables so their
//! order is preserved:
//!
//! ```toml
//! on_conflict = "skip"
//! log_file = "logs/organizer.log"
//!
//! [[categories]]
//! label = "Images"
//! extensions = [".jpg", "png"]
//!
//! [[categories]]
//! label = "Others"
//! extensions = []
//! ```

use crate::error::ConfigError;
use crate::file_category::{Category, CategoryTable, default_categories};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".filesorterrc.toml";

/// Default location of the persistent activity log, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "logs/organizer.log";

/// What to do when the destination already holds a file with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave both files where they are and report the file as not moved.
    #[default]
    Skip,
    /// Replace the file already in the category folder.
    Overwrite,
}

/// One `[[categories]]` entry as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Configuration as read from disk, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default = "default_rules")]
    pub categories: Vec<CategoryRule>,

    #[serde(default)]
    pub on_conflict: ConflictPolicy,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// The file this configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

fn default_rules() -> Vec<CategoryRule> {
    default_categories()
        .into_iter()
        .map(|category| CategoryRule {
            label: category.label().to_string(),
            extensions: category.extensions().to_vec(),
        })
        .collect()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            categories: default_rules(),
            on_conflict: ConflictPolicy::default(),
            log_file: default_log_file(),
            source: None,
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.filesorterrc.toml` in the current directory
    /// 3. Look for `~/.config/filesorter/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("filesorter")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        tracing::debug!("no configuration file found, using built-in categories");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml(&content)?;
        config.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate the category rules into a lookup table.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules do not form a valid [`CategoryTable`].
    pub fn compile(&self) -> Result<CategoryTable, ConfigError> {
        CategoryTable::new(
            self.categories
                .iter()
                .map(|rule| Category::new(rule.label.clone(), &rule.extensions))
                .collect(),
        )
    }
}
