//! Sync state store lifecycle
//!
//! A [`SyncStateStore`] is opened with [`SyncStateStore::start`], which
//! loads the state persisted by the previous run and returns a
//! [`SyncSession`]. Workers record hashes through the session while the
//! run is in progress; every update is written through to disk. The
//! session flushes the state once more when stopped or dropped.
//!
//! # Concurrency
//!
//! One mutex per store guards both the in-memory state and the state
//! file. An update holds the lock across the mutation and the full file
//! write, so concurrent updates are persisted one at a time. Two
//! processes sharing a state file are not coordinated.

use super::cleanup::{CleanupExecutor, FsCleanup};
use super::document::{StateFormat, TomlFormat, SYNC_STATE_FILE_NAME};
use super::model::{SyncChange, SyncState};
use crate::error::{SyncError, SyncResult};
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Dependencies directory wiped on a dependency layer mode switch
pub const DEFAULT_DEPENDENCIES_DIR: &str = ".syncstate/deps";

/// State guarded by the store lock
#[derive(Debug)]
struct Inner {
    current: SyncState,
    previous: Option<SyncState>,
}

/// Persisted change-detection cache for one sync session
///
/// Records can only be read or written through the [`SyncSession`]
/// returned by [`SyncStateStore::start`], so the previous state is always
/// loaded before the first update:
///
/// ```compile_fail
/// use syncstate::SyncStateStore;
///
/// let store = SyncStateStore::new(true, "build", "cache");
/// store.update_resource_sync_state("Function", "aaa");
/// ```
///
/// ```no_run
/// use syncstate::SyncStateStore;
///
/// let session = SyncStateStore::new(true, "build", "cache").start()?;
/// session.update_resource_sync_state("Function", "aaa")?;
/// session.stop()?;
/// # Ok::<(), syncstate::SyncError>(())
/// ```
pub struct SyncStateStore {
    inner: Mutex<Inner>,
    dependency_layer: bool,
    build_dir: PathBuf,
    cache_dir: PathBuf,
    dependencies_dir: PathBuf,
    state_file: PathBuf,
    format: Box<dyn StateFormat>,
    cleanup: Box<dyn CleanupExecutor>,
}

impl SyncStateStore {
    /// Create a store for this session's mode. No disk I/O happens here.
    ///
    /// The state file lives next to `build_dir`, in its parent directory.
    pub fn new(
        dependency_layer: bool,
        build_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        let build_dir = build_dir.into();
        let state_file = state_file_path(&build_dir);
        Self {
            inner: Mutex::new(Inner {
                current: SyncState::new(dependency_layer),
                previous: None,
            }),
            dependency_layer,
            build_dir,
            cache_dir: cache_dir.into(),
            dependencies_dir: PathBuf::from(DEFAULT_DEPENDENCIES_DIR),
            state_file,
            format: Box::new(TomlFormat),
            cleanup: Box::new(FsCleanup),
        }
    }

    /// Override the dependencies directory removed on a mode switch
    pub fn with_dependencies_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dependencies_dir = path.into();
        self
    }

    /// Override how directories are removed on a mode switch
    pub fn with_cleanup(mut self, cleanup: impl CleanupExecutor + 'static) -> Self {
        self.cleanup = Box::new(cleanup);
        self
    }

    /// Override the state file encoding
    pub fn with_format(mut self, format: impl StateFormat + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    /// Path of the persisted state file
    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Dependency layer mode of this session
    pub fn dependency_layer(&self) -> bool {
        self.dependency_layer
    }

    /// Load the previous state and open a session
    ///
    /// A missing, unreadable or empty state file is a cold start. When the
    /// previous run used the other dependency layer mode, the build, cache
    /// and dependencies directories are removed before the session opens;
    /// the resource records are kept.
    pub fn start(self) -> SyncResult<SyncSession> {
        let mode_switched = {
            let mut inner = self.lock();
            self.read(&mut inner);
            debug!(
                "Entering sync context, previous state: {:?}, current state: {:?}",
                inner.previous, inner.current
            );
            inner
                .previous
                .as_ref()
                .is_some_and(|previous| previous.dependency_layer != self.dependency_layer)
        };

        if mode_switched {
            info!(
                "Dependency layer mode changed to {}, cleaning build artifacts",
                self.dependency_layer
            );
            self.cleanup_build_dirs()?;
        }

        Ok(SyncSession {
            handle: SyncHandle(Arc::new(self)),
            stopped: false,
        })
    }

    /// Start a session, run `f`, and always stop the session
    ///
    /// An error from `f` takes precedence over a failure to flush the
    /// state, which is then only logged.
    pub fn run<T>(self, f: impl FnOnce(&SyncSession) -> SyncResult<T>) -> SyncResult<T> {
        let session = self.start()?;
        let result = f(&session);
        let stopped = session.stop();

        match (result, stopped) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(stop_err)) => {
                warn!("Failed to save sync state: {}", stop_err);
                Err(e)
            }
        }
    }

    fn update_resource_sync_state(&self, resource_id: &str, hash_value: &str) -> SyncResult<()> {
        let mut inner = self.lock();
        debug!(
            "Updating resource_sync_state for resource {} with hash {}",
            resource_id, hash_value
        );
        inner
            .current
            .update_resource_sync_state(resource_id, hash_value);
        self.write(&inner.current)
    }

    fn record_resource_hash(&self, resource_id: &str, hash_value: &str) -> SyncResult<SyncChange> {
        let mut inner = self.lock();
        let change = inner.current.record_resource_hash(resource_id, hash_value);
        debug!("Resource {} {} with hash {}", resource_id, change, hash_value);
        if change != SyncChange::Unchanged {
            self.write(&inner.current)?;
        }
        Ok(change)
    }

    fn get_resource_latest_sync_hash(&self, resource_id: &str) -> Option<String> {
        let inner = self.lock();
        match inner.current.hash_for(resource_id) {
            Some(hash) => {
                debug!(
                    "Latest resource_sync_state hash {} found for resource {}",
                    hash, resource_id
                );
                Some(hash.to_string())
            }
            None => {
                debug!("No latest hash found for resource {}", resource_id);
                None
            }
        }
    }

    fn previous_state(&self) -> Option<SyncState> {
        self.lock().previous.clone()
    }

    fn current_state(&self) -> SyncState {
        self.lock().current.clone()
    }

    fn stop(&self) -> SyncResult<()> {
        let inner = self.lock();
        self.write(&inner.current)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Records are replaced whole, so a panicked holder cannot leave a torn state
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, inner: &mut Inner) {
        match read_state_file(&self.state_file, self.format.as_ref()) {
            Some(previous) => {
                inner.current.resource_records = previous.resource_records.clone();
                inner.previous = Some(previous);
            }
            None => debug!(
                "Missing previous sync state, will create {} at the end of this execution",
                self.state_file.display()
            ),
        }
    }

    fn write(&self, state: &SyncState) -> SyncResult<()> {
        if let Some(parent) = self.state_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SyncError::persist(&self.state_file, e))?;
        }
        fs::write(&self.state_file, self.format.encode(state))
            .map_err(|e| SyncError::persist(&self.state_file, e))
    }

    fn cleanup_build_dirs(&self) -> SyncResult<()> {
        debug!("Cleaning up build directory {}", self.build_dir.display());
        self.cleanup.remove_dir_if_exists(&self.build_dir)?;

        debug!("Cleaning up cache directory {}", self.cache_dir.display());
        self.cleanup.remove_dir_if_exists(&self.cache_dir)?;

        debug!(
            "Cleaning up dependencies directory {}",
            self.dependencies_dir.display()
        );
        self.cleanup.remove_dir_if_exists(&self.dependencies_dir)
    }
}

impl std::fmt::Debug for SyncStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncStateStore")
            .field("dependency_layer", &self.dependency_layer)
            .field("build_dir", &self.build_dir)
            .field("cache_dir", &self.cache_dir)
            .field("dependencies_dir", &self.dependencies_dir)
            .field("state_file", &self.state_file)
            .finish_non_exhaustive()
    }
}

/// Shared access to a started store
///
/// Cloning is cheap; every clone updates the same state under the same
/// lock. Only [`SyncSession`] hands these out, so a handle always refers
/// to a store whose previous state has been loaded.
#[derive(Debug, Clone)]
pub struct SyncHandle(Arc<SyncStateStore>);

impl SyncHandle {
    /// Record `hash_value` for `resource_id` and persist the whole state
    pub fn update_resource_sync_state(&self, resource_id: &str, hash_value: &str) -> SyncResult<()> {
        self.0.update_resource_sync_state(resource_id, hash_value)
    }

    /// Record `hash_value` unless it matches the recorded hash
    ///
    /// The lookup and the update happen under one lock, so concurrent
    /// callers recording the same resource see each other's hashes. The
    /// state is persisted only when the record changed.
    pub fn record_resource_hash(&self, resource_id: &str, hash_value: &str) -> SyncResult<SyncChange> {
        self.0.record_resource_hash(resource_id, hash_value)
    }

    /// Hash recorded for `resource_id` by this or a previous run
    pub fn get_resource_latest_sync_hash(&self, resource_id: &str) -> Option<String> {
        self.0.get_resource_latest_sync_hash(resource_id)
    }

    /// Snapshot of the state loaded at start, if any
    pub fn previous_state(&self) -> Option<SyncState> {
        self.0.previous_state()
    }

    /// Snapshot of the live state
    pub fn current_state(&self) -> SyncState {
        self.0.current_state()
    }

    /// Path of the persisted state file
    pub fn state_file(&self) -> &Path {
        self.0.state_file()
    }

    /// Dependency layer mode of this session
    pub fn dependency_layer(&self) -> bool {
        self.0.dependency_layer()
    }
}

/// An open sync session
///
/// Derefs to a [`SyncHandle`] for updates and queries. Use
/// [`SyncSession::handle`] to hand the store to worker threads. The state
/// is flushed by [`SyncSession::stop`], or on drop if the session was not
/// stopped.
#[derive(Debug)]
pub struct SyncSession {
    handle: SyncHandle,
    stopped: bool,
}

impl SyncSession {
    /// Shared handle for concurrent workers
    pub fn handle(&self) -> SyncHandle {
        self.handle.clone()
    }

    /// Persist the current state and close the session
    pub fn stop(mut self) -> SyncResult<()> {
        self.stopped = true;
        self.handle.0.stop()
    }
}

impl Deref for SyncSession {
    type Target = SyncHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        if let Err(e) = self.handle.0.stop() {
            warn!("Failed to save sync state on exit: {}", e);
        }
    }
}

/// State file location for a build directory
pub fn state_file_path(build_dir: &Path) -> PathBuf {
    build_dir
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(SYNC_STATE_FILE_NAME)
}

/// Read a persisted state without opening a session
///
/// Returns `None` for a missing, unreadable or empty file.
pub fn read_state_file(path: &Path, format: &dyn StateFormat) -> Option<SyncState> {
    match fs::read_to_string(path) {
        Ok(content) => format.decode(&content),
        Err(e) => {
            debug!("Cannot read sync state {}: {}", path.display(), e);
            None
        }
    }
}
