//! Configuration file support for Recipe Box.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/recipebox/config.toml`.

use crate::persistence::{JsonFileAdapter, PersistenceAdapter, SqliteAdapter};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Persistence backend selection
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(Error::Config(format!(
                "unknown backend '{}' (expected json or sqlite)",
                other
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Json => f.write_str("json"),
            Backend::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Backend choice and file names inside the data directory
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_json_file")]
    pub json_file: String,

    #[serde(default = "default_sqlite_file")]
    pub sqlite_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            json_file: default_json_file(),
            sqlite_file: default_sqlite_file(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("recipebox")
}

fn default_json_file() -> String {
    "recipes.json".into()
}

fn default_sqlite_file() -> String {
    "recipes.db".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("recipebox").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("storage.json_file", &self.storage.json_file),
            ("storage.sqlite_file", &self.storage.sqlite_file),
        ] {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", key)));
            }
        }
        Ok(())
    }

    /// File holding the store for `backend` inside `data_dir`
    pub fn storage_path(&self, data_dir: &Path, backend: Backend) -> PathBuf {
        match backend {
            Backend::Json => data_dir.join(&self.storage.json_file),
            Backend::Sqlite => data_dir.join(&self.storage.sqlite_file),
        }
    }

    /// Open the persistence adapter for `backend` inside `data_dir`
    pub fn open_adapter(
        &self,
        data_dir: &Path,
        backend: Backend,
    ) -> Result<Box<dyn PersistenceAdapter>> {
        let path = self.storage_path(data_dir, backend);
        tracing::debug!("Using {} backend at {:?}", backend, path);
        match backend {
            Backend::Json => Ok(Box::new(JsonFileAdapter::new(path))),
            Backend::Sqlite => Ok(Box::new(SqliteAdapter::open(&path)?)),
        }
    }
}
