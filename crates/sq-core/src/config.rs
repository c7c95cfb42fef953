//! Configuration types and parsing for sqerge.yml

use crate::error::{SqergeError, SqergeResult};
use crate::history::{HistoryStore, DEFAULT_HISTORY_TABLE};
use crate::tags::Tags;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names tried by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["sqerge.yml", "sqerge.yaml"];

const DEFAULT_DB_PATH: &str = ":memory:";

const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Project configuration from sqerge.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory holding the migration files
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Name of the history table
    #[serde(default = "default_history_table")]
    pub history_table: String,

    /// Tags applied to every run, merged with command line tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            migrations_dir: default_migrations_dir(),
            history_table: default_history_table(),
            tags: Vec::new(),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_migrations_dir() -> String {
    DEFAULT_MIGRATIONS_DIR.to_string()
}

fn default_history_table() -> String {
    DEFAULT_HISTORY_TABLE.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> SqergeResult<Self> {
        if !path.exists() {
            return Err(SqergeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SqergeError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    ///
    /// Looks for sqerge.yml, then sqerge.yaml; with neither present the
    /// defaults apply.
    pub fn load_from_dir(dir: &Path) -> SqergeResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        log::debug!("no config file in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    fn validate(&self) -> SqergeResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(SqergeError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.migrations_dir.trim().is_empty() {
            return Err(SqergeError::ConfigInvalid {
                message: "migrations_dir cannot be empty".to_string(),
            });
        }
        self.history_store()?;
        self.tags()?;
        Ok(())
    }

    /// Migration directory resolved against `root`.
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    pub fn history_store(&self) -> SqergeResult<HistoryStore> {
        HistoryStore::new(self.history_table.as_str())
    }

    /// Default tags as a [`Tags`] set.
    pub fn tags(&self) -> SqergeResult<Tags> {
        Tags::try_from_iter(self.tags.iter().map(String::as_str))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
