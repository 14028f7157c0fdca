//! Configuration management for syncstate

pub mod schema;

pub use schema::Config;

use crate::error::{SyncError, SyncResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of the project-local configuration
pub const LOCAL_CONFIG_FILE: &str = ".syncstate.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("syncstate")
            .join("config.toml")
    }

    /// Find the nearest `.syncstate.toml`, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> SyncResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load the global configuration with a local file layered on top
    ///
    /// Keys set in the local file override the global ones; tables are
    /// merged key by key.
    pub async fn load_merged(&self, local: Option<&Path>) -> SyncResult<Config> {
        let mut merged = if self.config_path.exists() {
            self.read_value(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            toml::Value::Table(toml::map::Map::new())
        };

        if let Some(path) = local {
            let overlay = self.read_value(path).await?;
            merge_values(&mut merged, overlay);
            debug!("Merged local config from {}", path.display());
        }

        merged.try_into().map_err(|e: toml::de::Error| SyncError::ConfigInvalid {
            path: local.unwrap_or(&self.config_path).to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> SyncResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SyncError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn read_value(&self, path: &Path) -> SyncResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SyncError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SyncResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SyncError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SyncResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`, overlay wins on conflicts
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
