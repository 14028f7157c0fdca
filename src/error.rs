//! Error types for syncstate
//!
//! All modules use `SyncResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for syncstate operations
pub type SyncResult<T> = Result<T, SyncError>;

/// All errors that can occur in syncstate
#[derive(Error, Debug)]
pub enum SyncError {
    // Sync state errors
    #[error("Failed to persist sync state to {path}: {source}")]
    StatePersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to clean up directory {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No sync state recorded for {0}")]
    ResourceNotFound(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a state persist error
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StatePersist {
            path: path.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::StatePersist { .. } => {
                Some("Check that the parent of the build directory exists and is writable")
            }
            Self::Cleanup { .. } => {
                Some("Remove the build, cache and dependencies directories manually and retry")
            }
            Self::ResourceNotFound(_) => Some("Run `syncstate show` to list recorded resources"),
            _ => None,
        }
    }
}
