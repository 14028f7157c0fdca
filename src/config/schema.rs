//! Configuration schema for syncstate
//!
//! Configuration is stored at `~/.config/syncstate/config.toml`, with an
//! optional project-local `.syncstate.toml` layered on top.

use crate::state::DEFAULT_DEPENDENCIES_DIR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Sync state settings
    pub sync: SyncConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Sync session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Build output directory; the state file is written next to it
    pub build_dir: PathBuf,

    /// Build cache directory
    pub cache_dir: PathBuf,

    /// Shared dependencies directory
    pub dependencies_dir: PathBuf,

    /// Use the shared dependency layer
    pub dependency_layer: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from(".syncstate/build"),
            cache_dir: PathBuf::from(".syncstate/cache"),
            dependencies_dir: PathBuf::from(DEFAULT_DEPENDENCIES_DIR),
            dependency_layer: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[sync]"));
        assert!(toml.contains("dependency_layer = true"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.sync.build_dir, PathBuf::from(".syncstate/build"));
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
[sync]
dependency_layer = false
build_dir = "out/build"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.sync.dependency_layer);
        assert_eq!(config.sync.build_dir, PathBuf::from("out/build"));
        assert_eq!(config.sync.cache_dir, PathBuf::from(".syncstate/cache"));
    }
}
