//! Build artifact cleanup on dependency layer mode switch

use crate::error::{SyncError, SyncResult};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Removes directories invalidated by a mode switch
pub trait CleanupExecutor: Send + Sync {
    /// Remove `path` recursively; an absent path is not an error
    fn remove_dir_if_exists(&self, path: &Path) -> SyncResult<()>;
}

/// Filesystem-backed cleanup
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCleanup;

impl CleanupExecutor for FsCleanup {
    fn remove_dir_if_exists(&self, path: &Path) -> SyncResult<()> {
        remove_dir_if_exists(path)
    }
}

/// Recursively remove a directory, tolerating its absence
pub fn remove_dir_if_exists(path: &Path) -> SyncResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Nothing to remove at {}", path.display());
            Ok(())
        }
        Err(e) => Err(SyncError::Cleanup {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn removes_nested_directory() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("build");
        fs::create_dir_all(build.join("Function").join("nested")).unwrap();
        fs::write(build.join("Function").join("app.py"), "print()").unwrap();

        remove_dir_if_exists(&build).unwrap();

        assert!(!build.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        FsCleanup.remove_dir_if_exists(&missing).unwrap();
        FsCleanup.remove_dir_if_exists(&missing).unwrap();
    }

    #[test]
    fn file_in_place_of_directory_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("build");
        fs::write(&file, "not a directory").unwrap();

        let err = remove_dir_if_exists(&file).unwrap_err();
        assert!(matches!(err, SyncError::Cleanup { .. }));
    }
}
